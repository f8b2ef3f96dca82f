//! The catalog of contracts the regions endpoint is held to.

use crate::config::Settings;
use crate::contract::{ContractCase, Expectation, Probe};
use crate::models::{messages, RegionsQuery, Q_MAX_CHARS};

pub fn catalog(settings: &Settings) -> Vec<ContractCase> {
    let default_page_size = settings.default_page_size;

    vec![
        ContractCase::new("get_all_regions", "no parameters returns a listing", RegionsQuery::new())
            .expect(Expectation::Listing),
        ContractCase::new(
            "default_page_size",
            "no parameters returns a full default page",
            RegionsQuery::new(),
        )
        .expect(Expectation::ItemCount(default_page_size)),
        ContractCase::new(
            "filter_by_country",
            "country_code=ru keeps only Russian regions",
            RegionsQuery::new().country_code("ru"),
        )
        .expect(Expectation::CountryCode("ru".into())),
        ContractCase::new(
            "kz_region",
            "country_code=kz keeps only Kazakh regions",
            RegionsQuery::new().country_code("kz"),
        )
        .expect(Expectation::CountryCode("kz".into())),
        ContractCase::new("search_by_name", "q matches region names", RegionsQuery::new().q("нов"))
            .expect(Expectation::NameContains("нов".into())),
        ContractCase::new("search_nothing_name", "empty q is rejected", RegionsQuery::new().q(""))
            .expect(Expectation::error(messages::Q_TOO_SHORT)),
        ContractCase::new(
            "pagination",
            "page_size=5 bounds the page",
            RegionsQuery::new().page(1).page_size(5),
        )
        .expect(Expectation::MaxItems(5)),
        ContractCase::new(
            "invalid_params",
            "unknown country_code is rejected",
            RegionsQuery::new().country_code("asd"),
        )
        .expect(Expectation::error(messages::COUNTRY_CODE)),
        ContractCase::new("min_page_value", "page=1 is accepted", RegionsQuery::new().page(1))
            .expect(Expectation::Listing),
        ContractCase::new(
            "max_page_size_value",
            "page_size=15 bounds the page",
            RegionsQuery::new().page_size(15),
        )
        .expect(Expectation::MaxItems(15)),
        ContractCase::new(
            "max_length_search_query",
            "q over the length limit is rejected",
            RegionsQuery::new().q("a".repeat(Q_MAX_CHARS + 1)),
        )
        .expect(Expectation::error(messages::Q_TOO_LONG)),
        ContractCase::new(
            "min_length_search_query",
            "two-character q is rejected",
            RegionsQuery::new().q("aa"),
        )
        .expect(Expectation::error(messages::Q_TOO_SHORT)),
        ContractCase::new(
            "no_results_for_query",
            "q without matches returns an empty page",
            RegionsQuery::new().q("zzz"),
        )
        .expect(Expectation::ItemCount(0)),
        ContractCase::new("zero_page_value", "page=0 is rejected", RegionsQuery::new().page(0))
            .expect(Expectation::error(messages::PAGE_NOT_POSITIVE)),
        ContractCase::new("negative_page_value", "page=-1 is rejected", RegionsQuery::new().page(-1))
            .expect(Expectation::error(messages::PAGE_NOT_POSITIVE)),
        ContractCase::new("int_page_value", "page=1.5 is rejected", RegionsQuery::new().page(1.5))
            .expect(Expectation::error(messages::PAGE_NOT_INTEGER)),
        ContractCase::new(
            "invalid_page_size_value",
            "page_size outside 5/10/15 is rejected",
            RegionsQuery::new().page_size(20),
        )
        .expect(Expectation::error(messages::PAGE_SIZE)),
        ContractCase::new(
            "repeated_request",
            "identical requests satisfy the same checks",
            RegionsQuery::new(),
        )
        .probe(Probe::Repeat(2))
        .expect(Expectation::ItemCount(default_page_size)),
        ContractCase::new(
            "pagination_walk",
            "consecutive pages stay bounded with a stable total",
            RegionsQuery::new().page_size(5),
        )
        .probe(Probe::Walk { max_pages: settings.max_pages })
        .expect(Expectation::MaxItems(5)),
    ]
}

/// Cases whose name is in `only`; everything when `only` is empty.
pub fn select(cases: Vec<ContractCase>, only: &[String]) -> Vec<ContractCase> {
    if only.is_empty() {
        return cases;
    }
    cases.into_iter().filter(|c| only.iter().any(|n| n == c.name)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique_and_every_case_asserts_something() {
        let cases = catalog(&Settings::default());
        let names: HashSet<&str> = cases.iter().map(|c| c.name).collect();
        assert_eq!(names.len(), cases.len());
        assert!(cases.iter().all(|c| !c.expectations.is_empty()));
    }

    #[test]
    fn every_rejection_message_is_covered() {
        let cases = catalog(&Settings::default());
        let fragments: HashSet<String> = cases
            .iter()
            .flat_map(|c| c.expectations.iter())
            .filter_map(|e| match e {
                Expectation::ErrorMessage(m) => Some(m.clone()),
                _ => None,
            })
            .collect();
        for expected in [
            messages::Q_TOO_SHORT,
            messages::Q_TOO_LONG,
            messages::COUNTRY_CODE,
            messages::PAGE_NOT_POSITIVE,
            messages::PAGE_NOT_INTEGER,
            messages::PAGE_SIZE,
        ] {
            assert!(fragments.contains(expected), "no case expects {expected:?}");
        }
    }

    #[test]
    fn select_filters_by_name() {
        let only = vec!["kz_region".to_string(), "missing".to_string()];
        let picked = select(catalog(&Settings::default()), &only);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].name, "kz_region");
    }
}
