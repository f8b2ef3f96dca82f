//! Request/response contracts and the checker that evaluates them.

use std::fmt;

use thiserror::Error;

use crate::models::{RegionsPage, RegionsQuery, RegionsResponse};
use crate::regions::{RegionsClient, RegionsError};

/// One asserted property of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// Body is a `{total, items}` listing.
    Listing,
    /// Listing with exactly this many items.
    ItemCount(usize),
    /// Listing with at most this many items.
    MaxItems(usize),
    /// Every item belongs to this country.
    CountryCode(String),
    /// Every item name contains this text, ignoring case.
    NameContains(String),
    /// Error body whose message contains this fragment.
    ErrorMessage(String),
}

impl Expectation {
    pub fn error(fragment: &str) -> Self {
        Expectation::ErrorMessage(fragment.to_string())
    }

    fn wants_error(&self) -> bool {
        matches!(self, Expectation::ErrorMessage(_))
    }
}

/// How a case talks to the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Once,
    /// Same request `n` times in a row; every response must hold.
    Repeat(u32),
    /// `page = 1..=max_pages`; every page must hold and `total` must not move.
    Walk { max_pages: u32 },
}

#[derive(Debug, Clone)]
pub struct ContractCase {
    pub name: &'static str,
    pub about: &'static str,
    pub query: RegionsQuery,
    pub probe: Probe,
    pub expectations: Vec<Expectation>,
}

impl ContractCase {
    pub fn new(name: &'static str, about: &'static str, query: RegionsQuery) -> Self {
        Self {
            name,
            about,
            query,
            probe: Probe::Once,
            expectations: Vec::new(),
        }
    }

    pub fn expect(mut self, expectation: Expectation) -> Self {
        self.expectations.push(expectation);
        self
    }

    pub fn probe(mut self, probe: Probe) -> Self {
        self.probe = probe;
        self
    }
}

#[derive(Debug, Error)]
pub enum Violation {
    #[error("transport: {0}")]
    Transport(#[from] RegionsError),
    #[error("expected a listing, got error {message:?}")]
    ExpectedListing { message: String },
    #[error("expected error containing {expected:?}, got listing with total {total}")]
    ExpectedError { expected: String, total: u64 },
    #[error("error message {actual:?} does not contain {expected:?}")]
    MessageMismatch { expected: String, actual: String },
    #[error("expected {expected} items, got {actual}")]
    ItemCount { expected: usize, actual: usize },
    #[error("expected at most {max} items, got {actual}")]
    TooManyItems { max: usize, actual: usize },
    #[error("item #{index} {name:?} has country {actual:?}, expected {expected:?}")]
    CountryMismatch {
        index: usize,
        name: String,
        expected: String,
        actual: String,
    },
    #[error("item #{index} {name:?} does not contain {needle:?}")]
    NameMismatch { index: usize, name: String, needle: String },
    #[error("page {page} reports total {actual}, page 1 reported {first}")]
    TotalDrift { page: usize, first: u64, actual: u64 },
    #[error("page walk returned no pages")]
    EmptyWalk,
}

/// Outcome of one case.
#[derive(Debug)]
pub struct Verdict {
    pub case: &'static str,
    pub requests: u32,
    pub violations: Vec<Violation>,
}

impl Verdict {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed() {
            return write!(f, "PASS {}", self.case);
        }
        write!(f, "FAIL {}", self.case)?;
        for v in &self.violations {
            write!(f, "\n  - {v}")?;
        }
        Ok(())
    }
}

/// Pure evaluation of expectations against one classified response.
pub fn evaluate(expectations: &[Expectation], response: &RegionsResponse) -> Vec<Violation> {
    let mut out = Vec::new();

    match response {
        RegionsResponse::Error(err) => {
            let actual = err.message();
            for exp in expectations {
                if let Expectation::ErrorMessage(expected) = exp {
                    if !actual.contains(expected.as_str()) {
                        out.push(Violation::MessageMismatch {
                            expected: expected.clone(),
                            actual: actual.to_string(),
                        });
                    }
                }
            }
            // one report is enough however many listing checks were asked for
            if expectations.iter().any(|e| !e.wants_error()) {
                out.push(Violation::ExpectedListing { message: actual.to_string() });
            }
        }
        RegionsResponse::Page(page) => {
            for exp in expectations {
                check_page(exp, page, &mut out);
            }
        }
    }

    out
}

fn check_page(exp: &Expectation, page: &RegionsPage, out: &mut Vec<Violation>) {
    let actual = page.items.len();
    match exp {
        Expectation::Listing => {}
        Expectation::ItemCount(expected) => {
            if actual != *expected {
                out.push(Violation::ItemCount { expected: *expected, actual });
            }
        }
        Expectation::MaxItems(max) => {
            if actual > *max {
                out.push(Violation::TooManyItems { max: *max, actual });
            }
        }
        Expectation::CountryCode(expected) => {
            for (index, item) in page.items.iter().enumerate() {
                if item.country.code != *expected {
                    out.push(Violation::CountryMismatch {
                        index,
                        name: item.name.clone(),
                        expected: expected.clone(),
                        actual: item.country.code.clone(),
                    });
                }
            }
        }
        Expectation::NameContains(needle) => {
            let lowered = needle.to_lowercase();
            for (index, item) in page.items.iter().enumerate() {
                if !item.name.to_lowercase().contains(&lowered) {
                    out.push(Violation::NameMismatch {
                        index,
                        name: item.name.clone(),
                        needle: needle.clone(),
                    });
                }
            }
        }
        Expectation::ErrorMessage(expected) => out.push(Violation::ExpectedError {
            expected: expected.clone(),
            total: page.total,
        }),
    }
}

/// Runs one case against the endpoint. Transport failures end the case.
pub async fn check(client: &RegionsClient, case: &ContractCase) -> Verdict {
    let mut verdict = Verdict {
        case: case.name,
        requests: 0,
        violations: Vec::new(),
    };

    match case.probe {
        Probe::Once | Probe::Repeat(_) => {
            let times = match case.probe {
                Probe::Repeat(n) => n.max(1),
                _ => 1,
            };
            for _ in 0..times {
                verdict.requests += 1;
                match client.fetch(&case.query).await {
                    Ok(resp) => verdict.violations.extend(evaluate(&case.expectations, &resp)),
                    Err(e) => {
                        verdict.violations.push(e.into());
                        break;
                    }
                }
            }
        }
        Probe::Walk { max_pages } => match client.fetch_pages(&case.query, max_pages).await {
            Ok(responses) => {
                verdict.requests = responses.len() as u32;
                verdict.violations.extend(evaluate_walk(&case.expectations, &responses));
            }
            Err(e) => verdict.violations.push(e.into()),
        },
    }

    verdict
}

/// Every walked page must be a bounded listing reporting the same `total`.
pub fn evaluate_walk(expectations: &[Expectation], responses: &[RegionsResponse]) -> Vec<Violation> {
    if responses.is_empty() {
        return vec![Violation::EmptyWalk];
    }

    let mut out = Vec::new();
    let mut first_total = None;
    for (i, resp) in responses.iter().enumerate() {
        let page = match resp {
            RegionsResponse::Page(page) => page,
            RegionsResponse::Error(err) => {
                out.push(Violation::ExpectedListing { message: err.message().to_string() });
                continue;
            }
        };
        let first = *first_total.get_or_insert(page.total);
        if page.total != first {
            out.push(Violation::TotalDrift {
                page: i + 1,
                first,
                actual: page.total,
            });
        }
        for exp in expectations {
            check_page(exp, page, &mut out);
        }
    }
    out
}
