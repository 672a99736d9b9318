//! Property-based tests for manifest resolution.
//!
//! Graphs are drawn from a small name pool so that consumer, source and old
//! manifest overlap often.

use std::collections::BTreeMap;

use proptest::prelude::*;

use component_manifest::{
    resolve_manifest, select_components, ComponentSelector, Node, NodeIndex, NodeKey, NodeKind,
    OwnershipMap, Partition, ResolutionOptions, ResolutionWarning,
};

const KIT: &str = "ui-kit";
const THEME: &str = "@theme";
const OWNERS: [&str; 3] = [KIT, THEME, "other-kit"];

type SnippetSpec = (bool, Vec<usize>, Vec<usize>);

fn snippet_name(i: usize) -> String {
    format!("s{}", i)
}

fn asset_name(i: usize) -> String {
    format!("a{}.css", i)
}

fn build_nodes(root: &str, snippets: BTreeMap<usize, SnippetSpec>, assets: Vec<usize>) -> Vec<Node> {
    let mut nodes: Vec<Node> = snippets
        .into_iter()
        .map(|(i, (is_component, snippet_refs, asset_refs))| {
            let kind = if is_component {
                NodeKind::Component
            } else {
                NodeKind::Snippet
            };
            Node::new(snippet_name(i), kind, format!("{}/s{}.liquid", root, i))
                .with_snippets(snippet_refs.into_iter().map(snippet_name))
                .with_assets(asset_refs.into_iter().map(asset_name))
        })
        .collect();
    nodes.extend(
        assets
            .into_iter()
            .map(|i| Node::asset(asset_name(i), format!("{}/a{}.css", root, i))),
    );
    nodes
}

/// Strategy for snippet-partition nodes keyed by pool index.
fn snippet_specs() -> impl Strategy<Value = BTreeMap<usize, SnippetSpec>> {
    prop::collection::btree_map(
        0..6usize,
        (
            any::<bool>(),
            prop::collection::vec(0..6usize, 0..3),
            prop::collection::vec(0..4usize, 0..3),
        ),
        0..6,
    )
}

fn asset_specs() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::btree_set(0..4usize, 0..4).prop_map(|set| set.into_iter().collect())
}

/// Strategy for a source collection graph.
fn source_graph() -> impl Strategy<Value = Vec<Node>> {
    (snippet_specs(), asset_specs()).prop_map(|(snippets, assets)| build_nodes("kit", snippets, assets))
}

/// Strategy for a consumer graph with entry points.
fn consumer_graph() -> impl Strategy<Value = Vec<Node>> {
    (
        snippet_specs(),
        asset_specs(),
        prop::collection::vec(prop::collection::vec(0..6usize, 0..4), 0..3),
    )
        .prop_map(|(snippets, assets, entries)| {
            let mut nodes = build_nodes("theme", snippets, assets);
            for (j, refs) in entries.into_iter().enumerate() {
                nodes.push(
                    Node::entry(format!("page{}", j), format!("theme/templates/page{}.json", j))
                        .with_snippets(refs.into_iter().map(snippet_name)),
                );
            }
            nodes
        })
}

/// Strategy for a previous manifest.
fn old_map() -> impl Strategy<Value = OwnershipMap> {
    prop::collection::vec((any::<bool>(), 0..6usize, 0..OWNERS.len()), 0..8).prop_map(|entries| {
        let mut map = OwnershipMap::new();
        for (is_asset, i, owner) in entries {
            if is_asset {
                map.assign(Partition::Assets, asset_name(i % 4), OWNERS[owner]);
            } else {
                map.assign(Partition::Snippets, snippet_name(i), OWNERS[owner]);
            }
        }
        map
    })
}

fn options(ignore_conflicts: bool, ignore_overrides: bool) -> ResolutionOptions {
    ResolutionOptions::new()
        .ignore_conflicts(ignore_conflicts)
        .ignore_overrides(ignore_overrides)
}

fn has_file(nodes: &[Node], key: &NodeKey) -> bool {
    nodes
        .iter()
        .any(|n| n.kind != NodeKind::Entry && &n.key() == key)
}

fn sorted(mut warnings: Vec<ResolutionWarning>) -> Vec<ResolutionWarning> {
    warnings.sort();
    warnings
}

proptest! {
    /// A map resolved from scratch is a fixpoint and the rerun adds no warnings.
    ///
    /// Keeping conflicts while ignoring overrides hands kept files to the
    /// source on the rerun, so that policy is left out.
    #[test]
    fn resolution_from_empty_is_idempotent(
        consumer in consumer_graph(),
        source in source_graph(),
        ignore_conflicts in any::<bool>(),
        ignore_overrides in any::<bool>(),
    ) {
        prop_assume!(ignore_conflicts || !ignore_overrides);

        let options = options(ignore_conflicts, ignore_overrides);
        let first = resolve_manifest(&OwnershipMap::new(), &consumer, THEME, &source, KIT, &options).unwrap();
        let second = resolve_manifest(&first.files, &consumer, THEME, &source, KIT, &options).unwrap();

        prop_assert_eq!(&first.files, &second.files);
        for warning in &second.warnings {
            prop_assert!(first.warnings.contains(warning), "new warning: {}", warning);
        }
    }

    /// Files recorded as the consumer's own keep an entry unless the source
    /// takes them under ignore_overrides.
    #[test]
    fn consumer_owned_files_keep_an_entry(
        consumer in consumer_graph(),
        source in source_graph(),
        old in old_map(),
        ignore_conflicts in any::<bool>(),
        ignore_overrides in any::<bool>(),
    ) {
        let result = resolve_manifest(
            &old, &consumer, THEME, &source, KIT, &options(ignore_conflicts, ignore_overrides),
        ).unwrap();

        for (key, owner) in old.iter() {
            if owner != THEME || !has_file(&consumer, &key) {
                continue;
            }
            let now = result.files.owner_of(&key);
            if ignore_overrides {
                prop_assert!(now == Some(THEME) || now == Some(KIT), "{} now {:?}", key, now);
            } else {
                prop_assert_eq!(now, Some(THEME));
            }
        }
    }

    /// Reversing node lists changes neither the map nor the set of warnings.
    #[test]
    fn resolution_ignores_input_order(
        consumer in consumer_graph(),
        source in source_graph(),
        old in old_map(),
        ignore_conflicts in any::<bool>(),
        ignore_overrides in any::<bool>(),
    ) {
        let options = options(ignore_conflicts, ignore_overrides);
        let forward = resolve_manifest(&old, &consumer, THEME, &source, KIT, &options).unwrap();

        let mut consumer_rev = consumer.clone();
        consumer_rev.reverse();
        let mut source_rev = source.clone();
        source_rev.reverse();
        let reversed = resolve_manifest(&old, &consumer_rev, THEME, &source_rev, KIT, &options).unwrap();

        prop_assert_eq!(&forward.files, &reversed.files);
        prop_assert_eq!(sorted(forward.warnings), sorted(reversed.warnings));
    }

    /// Every dependency of a claimed name is owned by someone.
    #[test]
    fn claimed_closure_is_complete(
        consumer in consumer_graph(),
        source in source_graph(),
    ) {
        let result = resolve_manifest(
            &OwnershipMap::new(), &consumer, THEME, &source, KIT, &ResolutionOptions::new(),
        ).unwrap();
        let index = NodeIndex::new(&source);

        for key in result.files.owned_by(KIT) {
            let node = index.get(&key).unwrap();
            for child in node.ref_keys().filter(|k| index.contains(k)) {
                prop_assert!(result.files.contains(&child), "{} needed by {}", child, key);
            }
        }
    }

    /// An unmapped consumer file the source also has stays with the consumer.
    #[test]
    fn unmapped_conflicts_stay_with_consumer(
        consumer in consumer_graph(),
        source in source_graph(),
        old in old_map(),
        ignore_overrides in any::<bool>(),
    ) {
        let result = resolve_manifest(
            &old, &consumer, THEME, &source, KIT, &options(false, ignore_overrides),
        ).unwrap();
        let index = NodeIndex::new(&source);

        for node in consumer.iter().filter(|n| n.kind != NodeKind::Entry) {
            let key = node.key();
            if old.owner_of(&key).is_none() && index.contains(&key) {
                prop_assert_eq!(result.files.owner_of(&key), Some(THEME));
            }
        }
    }

    /// Files of a third collection are never taken over without ignore_overrides.
    #[test]
    fn third_party_files_are_not_taken(
        consumer in consumer_graph(),
        source in source_graph(),
        old in old_map(),
        ignore_conflicts in any::<bool>(),
    ) {
        let result = resolve_manifest(
            &old, &consumer, THEME, &source, KIT, &options(ignore_conflicts, false),
        ).unwrap();

        for (key, owner) in old.iter() {
            if owner == KIT || owner == THEME {
                continue;
            }
            let now = result.files.owner_of(&key);
            prop_assert!(now.is_none() || now == Some(owner), "{} moved to {:?}", key, now);
            if !has_file(&consumer, &key) {
                prop_assert!(now.is_none());
            }
        }
    }

    /// With a selector, the source only claims unmapped names inside the selection.
    #[test]
    fn selector_limits_new_claims(
        consumer in consumer_graph(),
        source in source_graph(),
        old in old_map(),
        pick in any::<prop::sample::Index>(),
        ignore_conflicts in any::<bool>(),
        ignore_overrides in any::<bool>(),
    ) {
        let components: Vec<&Node> = source
            .iter()
            .filter(|n| n.kind == NodeKind::Component)
            .collect();
        prop_assume!(!components.is_empty());
        let chosen = components[pick.index(components.len())].name.clone();

        let options = options(ignore_conflicts, ignore_overrides).with_selector(chosen.clone());
        let result = resolve_manifest(&old, &consumer, THEME, &source, KIT, &options).unwrap();

        let index = NodeIndex::new(&source);
        let selected = select_components(&ComponentSelector::parse(Some(chosen.as_str())), &index)
            .unwrap()
            .unwrap();

        for key in result.files.owned_by(KIT) {
            if old.owner_of(&key).is_none() {
                prop_assert!(selected.contains(&key), "{} claimed outside selection", key);
            }
        }
    }
}
