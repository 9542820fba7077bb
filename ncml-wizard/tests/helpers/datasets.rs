//! Dataset and wizard fixtures

use ncml_common::auth::LocalSession;
use ncml_common::ProjectType;
use ncml_wizard::models::FileSource;
use ncml_wizard::Wizard;

/// Customer churn sample with six data rows
pub const CHURN_CSV: &str = "tenure,charges,churned\n\
1,29.85,yes\n\
34,56.95,no\n\
2,53.85,yes\n\
45,42.30,no\n\
2,70.70,yes\n\
8,99.65,no\n";

pub fn churn_source() -> FileSource {
    FileSource::new("churn.csv", Some("text/csv"), CHURN_CSV.as_bytes().to_vec())
}

pub fn session() -> LocalSession {
    LocalSession::for_email("analyst@example.com", Some("Analyst".to_string()))
}

/// Wizard on the configure step with the churn dataset and `churned` as target
pub fn configured_churn_wizard() -> Wizard {
    let mut wizard = Wizard::start(&session()).expect("signed-in session");
    wizard.set_name("Churn").unwrap();
    wizard.set_project_type(ProjectType::Classifier).unwrap();
    wizard.next().unwrap();
    wizard.select_file(churn_source()).unwrap();
    wizard.next().unwrap();
    wizard.select_target("churned").unwrap();
    wizard
}
