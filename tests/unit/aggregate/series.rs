use super::*;

fn abc() -> Vec<Record> {
    vec![
        Record::new("A", 1, 10.0),
        Record::new("B", 1, -5.0),
        Record::new("C", 2, 3.0),
    ]
}

fn indices(entries: &[StackEntry]) -> Vec<usize> {
    entries.iter().map(|e| e.record).collect()
}

#[test]
fn partitions_the_reference_scenario() {
    let list = aggregate(&abc(), Measure::JobGrowth).unwrap();

    let s1 = list.quintile(1).unwrap();
    assert_eq!(indices(&s1.up), vec![0]);
    assert_eq!(indices(&s1.down), vec![1]);
    assert_eq!((s1.sum_up, s1.sum_down, s1.net), (10.0, -5.0, 5.0));

    let s2 = list.quintile(2).unwrap();
    assert_eq!(indices(&s2.up), vec![2]);
    assert!(s2.down.is_empty());
    assert_eq!((s2.sum_up, s2.sum_down, s2.net), (3.0, 0.0, 3.0));

    for q in 3..=5 {
        let s = list.quintile(q).unwrap();
        assert!(s.is_empty());
        assert_eq!((s.sum_up, s.sum_down, s.net), (0.0, 0.0, 0.0));
    }
}

#[test]
fn every_record_lands_in_exactly_one_stack_of_its_quintile() {
    let records: Vec<Record> = (0..40)
        .map(|i| {
            let v = ((i * 37) % 23) as f64 - 11.0;
            Record::new(format!("c{i}"), (i % 5) as i64 + 1, v)
        })
        .collect();
    let list = aggregate(&records, Measure::JobGrowth).unwrap();

    let mut seen = vec![0usize; records.len()];
    for s in list.iter() {
        for (_, _, e) in s.entries() {
            seen[e.record] += 1;
            assert_eq!(records[e.record].quintile, i64::from(s.id));
        }
        assert!(s.sum_up >= 0.0);
        assert!(s.sum_down <= 0.0);
        assert_eq!(s.net, s.sum_up + s.sum_down);
        assert!(s.up.iter().all(|e| e.value >= 0.0));
        assert!(s.down.iter().all(|e| e.value < 0.0));
    }
    assert!(seen.iter().all(|&n| n == 1));
    assert_eq!(list.box_count(), records.len());
}

#[test]
fn stacks_preserve_input_order() {
    let records = vec![
        Record::new("a", 3, 1.0),
        Record::new("b", 3, -1.0),
        Record::new("c", 3, 2.0),
        Record::new("d", 3, -2.0),
        Record::new("e", 3, 0.0),
    ];
    let s = aggregate(&records, Measure::JobGrowth).unwrap();
    let s3 = s.quintile(3).unwrap();
    assert_eq!(indices(&s3.up), vec![0, 2, 4]);
    assert_eq!(indices(&s3.down), vec![1, 3]);
}

#[test]
fn zero_values_go_up() {
    let s = aggregate(&[Record::new("z", 5, 0.0)], Measure::JobGrowth).unwrap();
    assert_eq!(s.quintile(5).unwrap().up.len(), 1);
}

#[test]
fn measure_switch_repartitions() {
    let records = vec![
        Record::new("a", 1, 10.0).with_avg_wage_growth(-2.0),
        Record::new("b", 1, -4.0).with_avg_wage_growth(6.0),
    ];
    let s = aggregate(&records, Measure::AvgWageGrowth).unwrap();
    let s1 = s.quintile(1).unwrap();
    assert_eq!(indices(&s1.up), vec![1]);
    assert_eq!(indices(&s1.down), vec![0]);
    assert_eq!(s1.net, 4.0);
}

#[test]
fn quintile_out_of_range_is_rejected() {
    let mut records = abc();
    records.push(Record::new("F", 6, 1.0));
    let err = aggregate(&records, Measure::JobGrowth).unwrap_err();
    assert!(matches!(err, WaterfallError::DataValidation(_)));
    assert!(err.to_string().contains("quintile 6"));

    let err = aggregate(&[Record::new("Z", 0, 1.0)], Measure::JobGrowth).unwrap_err();
    assert!(matches!(err, WaterfallError::DataValidation(_)));
}

#[test]
fn non_finite_values_are_rejected() {
    let err = aggregate(&[Record::new("N", 1, f64::NAN)], Measure::JobGrowth).unwrap_err();
    assert!(matches!(err, WaterfallError::DataValidation(_)));

    // Only the active measure is checked.
    let r = Record::new("I", 1, 1.0).with_avg_wage_growth(f64::INFINITY);
    assert!(aggregate(std::slice::from_ref(&r), Measure::JobGrowth).is_ok());
    assert!(aggregate(&[r], Measure::AvgWageGrowth).is_err());
}

#[test]
fn empty_input_yields_five_empty_series() {
    let s = aggregate(&[], Measure::JobGrowth).unwrap();
    assert_eq!(s.iter().count(), 5);
    assert_eq!(s.box_count(), 0);
    assert_eq!(s.min_net(), 0.0);
    assert_eq!(s.max_sum_up(), 0.0);
}
