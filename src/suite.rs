use crate::contract::{check, ContractCase, Verdict};
use crate::regions::RegionsClient;

#[derive(Debug, Default)]
pub struct SuiteReport {
    pub verdicts: Vec<Verdict>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.verdicts.iter().filter(|v| v.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.verdicts.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts.iter().filter(|v| !v.passed())
    }
}

/// Runs cases one after another; a failing case never stops the rest.
pub async fn run_suite(client: &RegionsClient, cases: &[ContractCase]) -> SuiteReport {
    let mut report = SuiteReport::default();

    for case in cases {
        let verdict = check(client, case).await;
        if verdict.passed() {
            tracing::info!(case = case.name, requests = verdict.requests, "pass");
        } else {
            tracing::warn!(
                case = case.name,
                about = case.about,
                violations = verdict.violations.len(),
                "fail"
            );
            for v in &verdict.violations {
                tracing::warn!(case = case.name, "{}", v);
            }
        }
        report.verdicts.push(verdict);
    }

    tracing::info!(passed = report.passed(), failed = report.failed(), "suite finished");
    report
}
