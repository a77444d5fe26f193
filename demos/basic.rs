use rulescope::{Session, SessionConfig};
use tracing_subscriber::EnvFilter;

const DATA: &str = "\
age,income,owns_home,label
35,52000,yes,approve
42,61000,no,approve
28,23000,no,reject
19,12000,no,reject
51,87000,yes,approve
23,31000,yes,approve
64,18000,no,reject
";

const RULES: &str = "\
if age >= 30 and income > 40000 then approve (3/0)
if owns_home = yes then approve (1/0)
else reject (3/0)
";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("RULESCOPE_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut session = Session::new(SessionConfig::default());
    session.import_dataset(DATA).expect("failed to import dataset");
    session.import_rules(RULES).expect("failed to import rules");

    let catalog = session.catalog().expect("dataset is loaded");
    for (idx, rule) in session.visible_rules() {
        let conditions: Vec<String> = rule
            .conditions()
            .iter()
            .map(|c| {
                format!(
                    "{} {} {}",
                    catalog.feature(c.feature()).name(),
                    c.op(),
                    c.value()
                )
            })
            .collect();
        let head = if rule.is_default() {
            "else".to_owned()
        } else {
            format!("if {}", conditions.join(" and "))
        };
        println!(
            "#{idx} {head} -> {}: support {:.1}%, confidence {:.1}%",
            rule.label(),
            rule.support(),
            rule.confidence()
        );
    }

    if let Some(aggregate) = session.aggregate() {
        println!("{aggregate}");
    }
}
