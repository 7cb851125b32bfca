//! Property tests for key uniqueness and logic acyclicity.

use std::collections::HashSet;

use form_integrity::{detect_logic_cycles, generate_unique_key, validate_unique_keys, LogicError};
use form_types::{ActionKind, ConditionOperator, Field, FieldType, Form, LogicRule, Page};
use proptest::prelude::*;
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

/// Optional aliases drawn from a small alphabet so collisions are common.
fn arb_aliases() -> impl Strategy<Value = Vec<Option<String>>> {
    prop::collection::vec(
        prop_oneof![
            Just(None),
            Just(Some(String::new())),
            "[a-cA-C]{1,2}".prop_map(Some),
            "f[0-9]".prop_map(Some),
        ],
        0..12,
    )
}

/// Spread fields named f0..fn over up to three pages.
fn form_from_aliases(aliases: &[Option<String>]) -> Form {
    let mut pages: Vec<Vec<Field>> = vec![Vec::new(), Vec::new(), Vec::new()];
    for (i, alias) in aliases.iter().enumerate() {
        let mut field = Field::new(format!("f{}", i), FieldType::ShortText);
        field.key = alias.clone();
        pages[i % 3].push(field);
    }
    pages
        .into_iter()
        .enumerate()
        .fold(Form::new("prop", "Prop"), |form, (i, fields)| {
            form.with_page(Page::new(format!("p{}", i), fields))
        })
}

fn jump(id: String, from: String, to: String) -> LogicRule {
    LogicRule::new(id)
        .when(from, ConditionOperator::Equals, json!("yes"))
        .then(ActionKind::Jump, to)
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// No findings exactly when every effective key is distinct.
    #[test]
    fn unique_keys_iff_no_errors(aliases in arb_aliases()) {
        let form = form_from_aliases(&aliases);
        let keys: Vec<&str> = form.fields().map(Field::effective_key).collect();
        let distinct: HashSet<&str> = keys.iter().copied().collect();

        let errors = validate_unique_keys(&form);
        prop_assert_eq!(errors.is_empty(), distinct.len() == keys.len());

        let reported: usize = errors.iter().map(|e| e.fields.len()).sum();
        prop_assert_eq!(reported - errors.len(), keys.len() - distinct.len());
    }

    /// A generated key is never already taken.
    #[test]
    fn generated_key_is_fresh(
        base in "[a-z]{1,4}",
        taken in prop::collection::hash_set("[a-z]{1,4}(-[2-6])?", 0..20),
    ) {
        let key = generate_unique_key(&base, &taken);
        prop_assert!(!taken.contains(&key));
        prop_assert!(key.starts_with(base.trim()));
    }

    /// Same inputs, same key.
    #[test]
    fn generated_key_is_deterministic(
        base in "[a-z]{1,4}",
        taken in prop::collection::hash_set("[a-z]{1,4}(-[2-4])?", 0..20),
    ) {
        prop_assert_eq!(
            generate_unique_key(&base, &taken),
            generate_unique_key(&base, &taken)
        );
    }

    /// Jumps that only ever go forward in field order cannot loop.
    #[test]
    fn forward_only_jumps_are_acyclic(
        edges in prop::collection::vec((0usize..8, 1usize..8), 0..16),
    ) {
        let fields: Vec<Field> = (0..16)
            .map(|i| Field::new(format!("f{}", i), FieldType::ShortText))
            .collect();
        let mut form = Form::new("chain", "Chain").with_page(Page::new("p1", fields));
        for (i, (from, step)) in edges.into_iter().enumerate() {
            form.logic.push(jump(
                format!("r{}", i),
                format!("f{}", from),
                format!("f{}", from + step),
            ));
        }
        prop_assert!(detect_logic_cycles(&form).is_empty());
    }

    /// A ring of n jumps is reported as exactly one cycle through all n fields.
    #[test]
    fn ring_is_one_cycle(n in 1usize..10) {
        let fields: Vec<Field> = (0..n)
            .map(|i| Field::new(format!("f{}", i), FieldType::ShortText))
            .collect();
        let mut form = Form::new("ring", "Ring").with_page(Page::new("p1", fields));
        for i in 0..n {
            form.logic.push(jump(
                format!("r{}", i),
                format!("f{}", i),
                format!("f{}", (i + 1) % n),
            ));
        }

        let errors = detect_logic_cycles(&form);
        prop_assert_eq!(errors.len(), 1);
        match &errors[0] {
            LogicError::Cycle { cycle } => {
                prop_assert_eq!(cycle.path.len(), n + 1);
                for i in 0..n {
                    let id = format!("f{}", i);
                    prop_assert!(cycle.contains(&id));
                }
            }
            other => prop_assert!(false, "expected a cycle, got {:?}", other),
        }
    }
}
