#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use sqlprune::cli::parse_tree;
use sqlprune::statement::first_statement_node;
use sqlprune::{Fields, Node, Value};
use tracing_subscriber::EnvFilter;

static INIT_TEST_LOGGING: std::sync::Once = std::sync::Once::new();

/// Makes sure logging is initialized for test.
pub fn init_test_logging() {
    INIT_TEST_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("sqlprune=debug,warn"))
            .with_test_writer()
            .try_init();
    });
}

/// Loads a serialized parse result from `tests/fixtures`.
pub fn fixture(name: &str) -> Node {
    let path = format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name);
    let text = std::fs::read_to_string(&path).unwrap();
    parse_tree(&text).unwrap()
}

pub fn first_select(tree: &Node) -> Node {
    first_statement_node(tree).unwrap().clone()
}

/// A parse result with a single `SELECT * FROM t [WHERE ...]`.
pub fn select_from(table: &str, where_clause: Option<Node>) -> Node {
    let from = sqlprune::expr::builder::base_table(table);
    let select = Node::object(
        Fields::new()
            .with("type", "SELECT_NODE")
            .with("modifiers", Node::array(vec![]))
            .with("select_list", Node::array(vec![]))
            .with("from_table", from)
            .with("where_clause", where_clause.unwrap_or(Node::Null))
            .with("group_expressions", Node::array(vec![])),
    );
    Node::object(
        Fields::new().with("error", false).with(
            "statements",
            Node::array(vec![Node::object(Fields::new().with("node", select))]),
        ),
    )
}

pub fn names(columns: &[&str]) -> HashSet<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

pub fn row(values: Vec<(&str, Value)>) -> HashMap<String, Value> {
    values.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

pub fn int(n: i64) -> Node {
    sqlprune::expr::builder::constant(Node::from(n)).unwrap()
}
