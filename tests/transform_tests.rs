mod common;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sqlprune::expr::builder::*;
    use sqlprune::matcher::*;
    use sqlprune::transform::*;
    use sqlprune::{Error, Fields, Kind, Node};

    use super::common::{fixture, first_select, int};

    // ========================================================================
    // Matchers
    // ========================================================================

    #[test]
    fn test_discriminator_matchers() {
        let comparison = equal(reference(&["c1"]), int(10));

        assert!(is_comparison(&comparison));
        assert!(is_class("COMPARISON")(&comparison));
        assert!(is_type("COMPARE_EQUAL")(&comparison));
        assert!(is_class_and_type("COMPARISON", "COMPARE_EQUAL")(&comparison));
        assert!(!is_class_and_type("COMPARISON", "COMPARE_LESSTHAN")(&comparison));
        assert!(!is_constant(&comparison));
    }

    #[test]
    fn test_reference_cast_needs_reference_child() {
        assert!(is_reference_cast(&cast(reference(&["c"]), "INTEGER")));
        assert!(!is_reference_cast(&cast(varchar("1"), "INTEGER")));
        assert!(is_cast(&cast(varchar("1"), "INTEGER")));
    }

    #[test]
    fn test_conjunction_matchers() {
        let and = and2(int(1), int(2));
        let or = or2(int(1), int(2));
        let empty = conjunction(sqlprune::ConjunctionOp::And, vec![]);

        assert!(is_conjunction_and(&and));
        assert!(!is_conjunction_and(&or));
        assert!(is_conjunction_or(&or));
        assert!(is_empty_conjunction_and(&empty));
        assert!(!is_empty_conjunction_and(&and));
    }

    #[test]
    fn test_select_matcher_on_fixture() {
        let tree = fixture("select_where.json");
        let select = first_select(&tree);

        assert!(is_select(&select));
        assert_eq!(select.kind(), Kind::Select);
        assert!(!is_select(&tree));
    }

    #[test]
    fn test_unknown_node_is_opaque() {
        let star = Node::object(Fields::new().with("class", "STAR").with("type", "STAR"));
        assert_eq!(star.kind(), Kind::Opaque);

        let bogus = Node::object(
            Fields::new()
                .with("class", "COMPARISON")
                .with("type", "COMPARE_SIMILAR"),
        );
        assert_eq!(bogus.kind(), Kind::Opaque);
        assert!(is_comparison(&bogus));
    }

    // ========================================================================
    // find
    // ========================================================================

    #[test]
    fn test_find_in_traversal_order() {
        let tree = fixture("select_where.json");
        let references = collect_references(&tree);

        let names: Vec<Vec<String>> = references
            .iter()
            .map(|r| column_names(r).unwrap())
            .collect();
        assert_eq!(names, vec![vec!["c1".to_string()], vec!["p".to_string()]]);
    }

    #[test]
    fn test_find_does_not_descend_into_match() {
        let inner = equal(reference(&["a"]), int(1));
        let outer = and2(inner.clone(), equal(reference(&["b"]), int(2)));

        let found = find(&outer, is_conjunction_and);
        assert_eq!(found.len(), 1);

        let comparisons = find(&outer, is_comparison);
        assert_eq!(comparisons.len(), 2);
        assert_eq!(comparisons[0], &inner);
    }

    #[test]
    fn test_find_prefers_children_over_other_fields() {
        // `extra` is not searched because `children` is present
        let node = Node::object(
            Fields::new()
                .with("children", Node::array(vec![reference(&["a"])]))
                .with("extra", reference(&["b"])),
        );
        assert_eq!(collect_references(&node).len(), 1);

        // a null `children` hides everything else too
        let node = Node::object(
            Fields::new()
                .with("children", Node::Null)
                .with("extra", reference(&["b"])),
        );
        assert!(collect_references(&node).is_empty());
    }

    #[test]
    fn test_find_in_generic_object_visits_all_fields() {
        let node = Node::object(
            Fields::new()
                .with("first", reference(&["a"]))
                .with("second", Node::array(vec![reference(&["b"]), Node::from(3)])),
        );
        assert_eq!(collect_references(&node).len(), 2);
    }

    #[test]
    fn test_scalars_terminate() {
        assert!(find(&Node::from("COLUMN_REF"), is_reference).is_empty());
        assert!(find(&Node::Null, is_reference).is_empty());
    }

    #[test]
    fn test_collectors() {
        let predicate = and2(
            equal(cast(reference(&["c", "x"]), "BIGINT"), int(1)),
            equal(reference(&["d"]), varchar("v")),
        );

        assert_eq!(collect_literals(&predicate).len(), 2);
        assert_eq!(collect_reference_casts(&predicate).len(), 1);
        // the reference under the cast is still found
        assert_eq!(collect_references(&predicate).len(), 2);
        assert!(collect_subqueries(&predicate).is_empty());
    }

    #[test]
    fn test_column_names() {
        assert_eq!(column_names(&reference(&["c", "x"])).unwrap(), vec!["c", "x"]);

        let empty = Node::object(
            Fields::new()
                .with("class", "COLUMN_REF")
                .with("type", "COLUMN_REF")
                .with("column_names", Node::array(vec![])),
        );
        assert!(matches!(column_names(&empty), Err(Error::MalformedTree(_))));
        assert!(matches!(column_names(&int(1)), Err(Error::MalformedTree(_))));
    }

    // ========================================================================
    // transform
    // ========================================================================

    #[test]
    fn test_transform_replaces_matches() {
        let predicate = and2(equal(reference(&["a"]), int(1)), equal(reference(&["b"]), int(2)));

        let rewritten = transform(&predicate, is_constant, |_| varchar("?"));

        let literals = collect_literals(&rewritten);
        assert_eq!(literals.len(), 2);
        assert!(literals.iter().all(|l| **l == varchar("?")));
        // input untouched
        assert_eq!(collect_literals(&predicate)[0], &int(1));
    }

    #[test]
    fn test_transform_stops_at_match() {
        let predicate = and2(equal(reference(&["a"]), int(1)), int(2));
        let mut calls = 0;

        let rewritten = transform(&predicate, is_conjunction_and, |_| {
            calls += 1;
            true_literal()
        });

        assert_eq!(calls, 1);
        assert_eq!(rewritten, true_literal());
    }

    #[test]
    fn test_transform_without_match_returns_equal_tree() {
        let tree = fixture("select_where.json");
        let rewritten = transform(&tree, is_subquery, |n| n.clone());
        assert_eq!(rewritten, tree);
    }

    #[test]
    fn test_transform_shares_unchanged_subtrees() {
        let untouched = equal(reference(&["b"]), varchar("x"));
        let predicate = and2(equal(reference(&["a"]), int(1)), untouched);

        let rewritten = transform(&predicate, |n| *n == int(1), |_| int(2));

        let before = predicate.get("children").and_then(Node::as_array).unwrap();
        let after = rewritten.get("children").and_then(Node::as_array).unwrap();
        assert_ne!(before[0], after[0]);
        match (&before[1], &after[1]) {
            (Node::Object(a), Node::Object(b)) => assert!(Arc::ptr_eq(a, b)),
            _ => panic!("expected objects"),
        }
    }

    #[test]
    fn test_try_transform_propagates_first_error() {
        let predicate = and2(equal(reference(&["a"]), int(1)), equal(reference(&["b"]), int(2)));
        let mut seen = 0;

        let result: Result<Node, Error> = try_transform(&predicate, is_constant, |_| {
            seen += 1;
            Err(Error::UnsupportedShape("no".to_string()))
        });

        assert_eq!(result, Err(Error::UnsupportedShape("no".to_string())));
        assert_eq!(seen, 1);
    }

    #[test]
    fn test_with_field_is_persistent() {
        let original = reference(&["a"]);
        let renamed = original
            .with_field("column_names", Node::array(vec![Node::from("b")]))
            .unwrap();

        assert_eq!(column_names(&original).unwrap(), vec!["a"]);
        assert_eq!(column_names(&renamed).unwrap(), vec!["b"]);
        assert!(Node::from(1).with_field("x", Node::Null).is_err());
    }
}
