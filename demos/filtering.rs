use rulescope::{FilterCriteria, RegexCriteria, RuleFilter, Session, SessionConfig};
use tracing_subscriber::EnvFilter;

const DATA: &str = "\
age,city,plan,label
35,Boston,pro,renew
42,Berlin,basic,renew
28,Boston,basic,churn
19,Paris,basic,churn
51,Bergen,pro,renew
23,Paris,pro,renew
37,Lisbon,basic,churn
";

const RULES: &str = "\
if plan = pro then renew (3/0)
if age < 30 then churn (2/0)
else renew (2/1)
";

fn report(session: &Session, title: &str) {
    println!("== {title} ({} rows)", session.filtered_rows().len());
    for (idx, rule) in session.visible_rules() {
        println!(
            "  rule {idx} -> {}: support {:.1}%, confidence {:.1}%",
            rule.label(),
            rule.support(),
            rule.confidence()
        );
    }
    if let Some(aggregate) = session.aggregate() {
        println!("  {aggregate}");
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("RULESCOPE_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut session = Session::new(SessionConfig::default());
    session.import_dataset(DATA).expect("failed to import dataset");
    session.import_rules(RULES).expect("failed to import rules");
    report(&session, "all rows");

    session
        .set_dataset_filter(FilterCriteria::new().at_least("age", 25.0))
        .expect("valid criteria");
    report(&session, "age >= 25");

    let regex = RegexCriteria::new()
        .pattern("city", "^B")
        .expect("valid pattern");
    session.set_regex_filter(regex).expect("valid regex filter");
    report(&session, "age >= 25, city starts with B");

    session
        .set_rule_filter(RuleFilter::new(0.0, 90.0).with_interest(["plan"]))
        .expect("valid rule filter");
    report(&session, "confident rules on plan");
}
