//! Property tests: arbitrary drag sequences keep every zone contiguous

mod common;

use common::car_tree;
use posting_layout::{LayoutModel, ViewMode, ZoneId};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Drag {
    view: ViewMode,
    from_zone: usize,
    from: usize,
    to_zone: usize,
    to: usize,
}

fn view_strategy() -> impl Strategy<Value = ViewMode> {
    prop_oneof![
        Just(ViewMode::Form),
        Just(ViewMode::Detail),
        Just(ViewMode::Card),
    ]
}

fn drag_strategy() -> impl Strategy<Value = Drag> {
    (view_strategy(), 0..8usize, 0..8usize, 0..8usize, 0..8usize).prop_map(
        |(view, from_zone, from, to_zone, to)| Drag {
            view,
            from_zone,
            from,
            to_zone,
            to,
        },
    )
}

/// Apply a drag, folding the random indices into the model's real bounds.
/// Returns `None` when the source zone is empty.
fn apply(model: &LayoutModel, drag: &Drag) -> Option<LayoutModel> {
    let zones = model.resolver().zones(drag.view);
    let source = &zones[drag.from_zone % zones.len()];
    let dest = &zones[drag.to_zone % zones.len()];

    let source_len = model.fields_in_zone(drag.view, source).ok()?.len();
    if source_len == 0 {
        return None;
    }
    let dest_len = model.fields_in_zone(drag.view, dest).ok()?.len();
    let to = if source == dest {
        drag.to % source_len
    } else {
        drag.to % (dest_len + 1)
    };

    Some(
        model
            .with_moved(drag.view, source, drag.from % source_len, dest, to)
            .expect("indices are in range"),
    )
}

fn placements_of(model: &LayoutModel, view: ViewMode) -> Vec<(String, ZoneId, Option<u32>)> {
    let mut out: Vec<_> = model
        .fields()
        .iter()
        .map(|f| {
            let zone = ZoneId::of(view, f);
            let key = zone.sort_key(f);
            (f.id.to_string(), zone, key)
        })
        .collect();
    out.sort_by(|a, b| a.0.cmp(&b.0));
    out
}

proptest! {
    #[test]
    fn prop_drags_preserve_invariants(drags in prop::collection::vec(drag_strategy(), 1..24)) {
        let mut model = LayoutModel::from_tree(car_tree());
        let field_count = model.fields().len();

        for drag in &drags {
            if let Some(next) = apply(&model, drag) {
                prop_assert!(next.check_invariants().is_ok(), "{:?}", next.check_invariants());
                prop_assert_eq!(next.fields().len(), field_count);
                model = next;
            }
        }
    }

    #[test]
    fn prop_drag_only_touches_its_view(drag in drag_strategy()) {
        let model = LayoutModel::from_tree(car_tree());
        if let Some(next) = apply(&model, &drag) {
            for view in ViewMode::ALL {
                if view != drag.view {
                    prop_assert_eq!(placements_of(&model, view), placements_of(&next, view));
                }
            }
        }
    }

    #[test]
    fn prop_diff_replays_onto_store(drag in drag_strategy()) {
        let model = LayoutModel::from_tree(car_tree());
        if let Some(next) = apply(&model, &drag) {
            let ops = model.diff(&next);
            let store = posting_layout::MemoryStore::with_tree(model.to_tree());
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let replayed = runtime.block_on(async {
                for op in &ops {
                    op.apply(&store).await.unwrap();
                }
                posting_layout::TemplateStore::load_template_tree(
                    &store,
                    &model.template().category_id,
                )
                .await
                .unwrap()
                .unwrap()
            });
            prop_assert_eq!(LayoutModel::from_tree(replayed), next);
        }
    }

    #[test]
    fn prop_compacted_is_idempotent(drags in prop::collection::vec(drag_strategy(), 0..8)) {
        let mut model = LayoutModel::from_tree(car_tree());
        for drag in &drags {
            if let Some(next) = apply(&model, drag) {
                model = next;
            }
        }
        prop_assert_eq!(model.compacted(), model.clone());
        prop_assert!(model.diff(&model.compacted()).is_empty());
    }
}
