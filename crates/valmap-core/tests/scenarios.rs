//! End-to-end value-field scenarios over the reference truncated-normal table.

use valmap_core::grid::linspace;
use valmap_core::{
    DistanceTable, GridEvaluator, GridParams, PairwiseTable, SpatialGrid, TableParams, ValueField,
};
use valmap_types::ReferenceObject;

fn reference_table() -> DistanceTable {
    DistanceTable::truncated_normal(&TableParams::default()).expect("reference table")
}

fn reference_evaluator() -> GridEvaluator<DistanceTable> {
    let grid = SpatialGrid::symmetric(&GridParams::default()).expect("reference grid");
    GridEvaluator::new(reference_table(), grid)
}

fn assert_fields_close(a: &ValueField, b: &ValueField, tol: f64) {
    assert_eq!(a.shape(), b.shape());
    for (k, (x, y)) in a.as_slice().iter().zip(b.as_slice()).enumerate() {
        let scale = x.abs().max(y.abs()).max(1.0);
        assert!((x - y).abs() <= tol * scale, "cell {k}: {x} vs {y}");
    }
}

// ── Lookup properties ───────────────────────────────────────────────────────

#[test]
fn lookup_clamps_outside_table_domain() {
    let table = reference_table();
    let first = table.values()[0];
    let last = *table.values().last().unwrap();

    assert_eq!(table.value_at(-1.0), first);
    assert_eq!(table.value_at(-1e-12), first);
    assert_eq!(table.value_at(7.0 + 1e-9), last);
    assert_eq!(table.value_at(1e6), last);
}

#[test]
fn lookup_interior_points_select_lower_bucket() {
    let table = reference_table();
    for (i, pair) in table.boundaries().windows(2).enumerate() {
        let mid = 0.5 * (pair[0] + pair[1]);
        assert_eq!(table.bucket_for(mid), i, "midpoint {mid}");
        assert_eq!(table.value_at(mid), table.values()[i]);
    }
}

#[test]
fn lookup_at_zero_distance_uses_first_sample() {
    let table = reference_table();
    assert_eq!(table.boundaries()[0], 0.0);
    assert_eq!(table.bucket_for(0.0), 0);
    assert_eq!(table.value_at(0.0), table.values()[0]);

    // The sample point coincides with the object: distance 0.
    let grid = SpatialGrid::new(vec![0.0], vec![0.0]).unwrap();
    let ev = GridEvaluator::new(&table, grid);
    let field = ev.evaluate(&[ReferenceObject::new(0.0, 0.0)]);
    assert_eq!(field[(0, 0)], table.values()[0]);
    assert!((field[(0, 0)] - 0.144_869).abs() < 1e-5);
}

// ── Field properties ────────────────────────────────────────────────────────

#[test]
fn zero_objects_give_zero_field() {
    let field = reference_evaluator().evaluate(&[]);
    assert_eq!(field.shape(), (30, 30));
    assert!(field.as_slice().iter().all(|&v| v == 0.0));
}

#[test]
fn evaluation_is_additive_over_objects() {
    let ev = reference_evaluator();
    let o1 = ReferenceObject::new(-3.0, -4.0);
    let o2 = ReferenceObject::new(2.0, 1.0);

    let both = ev.evaluate(&[o1, o2]);
    let mut summed = ev.evaluate(&[o1]);
    summed.accumulate(&ev.evaluate(&[o2])).unwrap();

    assert_fields_close(&both, &summed, 1e-9);
}

#[test]
fn evaluation_order_only_affects_rounding() {
    let ev = reference_evaluator();
    let objs = [
        ReferenceObject::new(0.0, -1.0),
        ReferenceObject::new(3.0, 2.0),
        ReferenceObject::new(-6.5, 4.0),
    ];
    let mut reversed = objs;
    reversed.reverse();
    assert_fields_close(&ev.evaluate(&objs), &ev.evaluate(&reversed), 1e-9);
}

#[test]
fn centred_object_gives_symmetric_field() {
    // 0.5 spacing is exact in binary, so mirrored samples are exact negatives.
    let axis = linspace(-3.0, 3.0, 13);
    let grid = SpatialGrid::new(axis.clone(), axis).unwrap();
    let ev = GridEvaluator::new(reference_table(), grid);
    let field = ev.evaluate(&[ReferenceObject::new(0.0, 0.0)]);

    let n = 13;
    for i in 0..n {
        for j in 0..n {
            let v = field[(i, j)];
            assert_eq!(v, field[(n - 1 - i, j)], "x reflection at ({i}, {j})");
            assert_eq!(v, field[(i, n - 1 - j)], "y reflection at ({i}, {j})");
            assert_eq!(v, field[(j, i)], "diagonal reflection at ({i}, {j})");
        }
    }
}

#[test]
fn two_object_field_peaks_where_contributions_overlap() {
    let ev = reference_evaluator();
    let objs = [ReferenceObject::new(-3.0, -4.0), ReferenceObject::new(2.0, 1.0)];
    let field = ev.evaluate(&objs);

    let (i, j, peak) = field.argmax().expect("finite field");
    assert_eq!((i, j), (14, 12));
    assert!((peak - 0.360_561).abs() < 1e-5, "peak = {peak}");

    // The peak draws on both objects: it lies inside both radii and beats
    // either object's field alone.
    let sample = ev.grid().sample(i, j);
    for obj in &objs {
        assert!(sample.distance_to(obj.position()) < 7.0);
        let alone = ev.object_field(obj).max_value().unwrap();
        assert!(peak > alone, "peak {peak} should exceed single-object max {alone}");
    }
}

#[test]
fn parallel_evaluation_matches_sequential() {
    let ev = reference_evaluator();
    let objs: Vec<ReferenceObject> = (0..41)
        .map(|k| {
            let t = k as f64;
            ReferenceObject::new((t * 1.7).sin() * 8.0, (t * 0.9).cos() * 8.0)
        })
        .collect();
    assert_eq!(ev.evaluate(&objs), ev.evaluate_parallel(&objs));
}

// ── Pairwise tables ─────────────────────────────────────────────────────────

#[test]
fn collapsed_pairwise_table_scales_shared_field() {
    let table = reference_table();
    let n = 2;
    let flat: Vec<f64> = (0..n * n).flat_map(|_| table.values().to_vec()).collect();
    let pairwise = PairwiseTable::from_flat(flat, n, 7.0, 100).unwrap();

    let grid = SpatialGrid::symmetric(&GridParams::default()).unwrap();
    let shared = GridEvaluator::new(table, grid.clone());
    let collapsed = GridEvaluator::new(pairwise.collapsed(), grid);

    let objs = [ReferenceObject::new(1.0, 1.0)];
    let mut expected = ValueField::zeros(30, 30);
    for _ in 0..n * n {
        expected.accumulate(&shared.evaluate(&objs)).unwrap();
    }
    assert_fields_close(&collapsed.evaluate(&objs), &expected, 1e-9);
}

#[test]
fn subject_view_scores_partners_by_label() {
    let table = reference_table();
    // Pair (0, 1) carries the reference curve; every other pair is zero.
    let mut flat = vec![0.0; 2 * 2 * 100];
    flat[100..200].copy_from_slice(table.values());
    let pairwise = PairwiseTable::from_flat(flat, 2, 7.0, 100).unwrap();

    let grid = SpatialGrid::symmetric(&GridParams::default()).unwrap();
    let view = pairwise.for_subject(0).unwrap();
    let ev = GridEvaluator::new(view, grid.clone());

    let partner = ReferenceObject::labelled(1, 2.0, 1.0);
    let same_kind = ReferenceObject::labelled(0, -3.0, -4.0);
    let unknown = ReferenceObject::new(5.0, 5.0);
    let field = ev.evaluate(&[partner, same_kind, unknown]);

    let shared = GridEvaluator::new(table, grid);
    assert_eq!(field, shared.evaluate(&[ReferenceObject::new(2.0, 1.0)]));
}
