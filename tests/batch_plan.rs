use dualtrans::batch_plan::BatchPlan;

#[test]
fn six_paragraphs_in_batches_of_five() {
    let plan = BatchPlan::new(6, 5);
    assert_eq!(plan.len(), 2);
    assert_eq!(plan.batches[0].slots(), 0..5);
    assert_eq!(plan.batches[1].slots(), 5..6);
}

#[test]
fn batches_partition_every_count_exactly() {
    for size in 1..=7 {
        for n in 0..=23 {
            let plan = BatchPlan::new(n, size);
            let mut covered = Vec::new();
            for (i, b) in plan.batches.iter().enumerate() {
                assert_eq!(b.batch_index, i);
                assert_eq!(b.start, i * size);
                assert!(b.len >= 1 && b.len <= size);
                covered.extend(b.slots());
            }
            assert_eq!(covered, (0..n).collect::<Vec<_>>(), "n={n} size={size}");
        }
    }
}

#[test]
fn empty_document_has_no_batches() {
    assert!(BatchPlan::new(0, 5).is_empty());
}
