//! Property 1: Path resolution is total and bounded
//!
//! For any working directory, argument and length cap, `resolve` returns
//! an absolute path no longer than the cap, with no `.`/`..`/empty
//! interior components, and resolving the same input twice gives the
//! same answer.

use proptest::prelude::*;
use terminal::path::{basename, join, PathResolver};

fn arb_component() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-z]{1,8}",
        1 => Just(".".to_string()),
        1 => Just("..".to_string()),
        1 => Just(String::new()),
    ]
}

fn arb_arg() -> impl Strategy<Value = String> {
    (proptest::bool::ANY, proptest::collection::vec(arb_component(), 0..12)).prop_map(
        |(absolute, parts)| {
            let body = parts.join("/");
            if absolute {
                format!("/{body}")
            } else {
                body
            }
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn resolved_paths_are_absolute_and_bounded(
        cwd in arb_arg(),
        arg in arb_arg(),
        max in 1usize..300,
    ) {
        let resolver = PathResolver::new(&cwd, max);
        let resolved = resolver.resolve(&arg);

        prop_assert!(resolved.starts_with('/'), "not absolute: {:?}", resolved);
        prop_assert!(resolved.len() <= max, "{} > {}", resolved.len(), max);
        prop_assert!(!resolved.contains("//"), "double separator: {:?}", resolved);
        for component in resolved.split('/').skip(1) {
            prop_assert!(component != "." && component != "..", "{:?}", resolved);
        }
        prop_assert_eq!(&resolved, &resolver.resolve(&arg));
    }

    #[test]
    fn empty_argument_is_cwd(cwd in arb_arg()) {
        let resolver = PathResolver::new(&cwd, 255);
        prop_assert_eq!(resolver.resolve(""), resolver.cwd());
    }

    #[test]
    fn resolution_is_idempotent_below_the_cap(cwd in arb_arg(), arg in arb_arg()) {
        let resolver = PathResolver::new(&cwd, 255);
        let once = resolver.resolve(&arg);
        prop_assume!(once.len() < 255);
        prop_assert_eq!(resolver.resolve(&once), once);
    }

    #[test]
    fn join_then_basename(dir in "(/[a-z]{1,6}){0,4}/?", name in "[a-z]{1,8}") {
        let dir = if dir.is_empty() { "/" } else { dir.as_str() };
        let joined = join(dir, &name);
        prop_assert!(!joined.contains("//"));
        prop_assert_eq!(basename(&joined), name.as_str());
    }
}
