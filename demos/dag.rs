use rulescope::{NodeKind, Session, SessionConfig};
use tracing_subscriber::EnvFilter;

const DATA: &str = "\
temp,humidity,wind,label
30,85,weak,no
27,90,strong,no
21,70,weak,yes
18,65,strong,no
24,60,weak,yes
";

const RULES: &str = "\
if humidity > 80 then no (2/0)
if wind = strong and temp < 20 then no (1/0)
if temp >= 20 then yes (2/0)
else no (0/0)
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
    println!("feature order:");
    for ranked in session.ranked_features() {
        println!("  {} ({:.2})", ranked.name, ranked.strength);
    }

    let dag = session.dag().expect("rules are loaded");
    println!(
        "\n{} nodes, depth {}, {} outcomes",
        dag.len(),
        dag.depth(),
        dag.height()
    );
    for node in dag.nodes() {
        let name = catalog.feature(node.feature).name();
        match node.kind {
            NodeKind::Condition(op) => println!(
                "  [{}] rule {}: {name} {op} {}  true -> {:?}, false -> {:?}",
                node.id, node.rule, node.value, node.true_child, node.false_child
            ),
            NodeKind::Outcome => println!("  [{}] {name} = {}", node.id, node.value),
        }
    }
}
