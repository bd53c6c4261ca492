use super::*;

#[test]
fn extract_selects_the_named_field() {
    let r = Record::new("Nurses", 4, 1200.0).with_avg_wage_growth(-3.5);
    assert_eq!(Measure::JobGrowth.extract(&r), 1200.0);
    assert_eq!(Measure::AvgWageGrowth.extract(&r), -3.5);
}

#[test]
fn ids_round_trip_through_from_str() {
    for m in Measure::ALL {
        assert_eq!(m.id().parse::<Measure>().unwrap(), m);
    }
    assert_eq!(
        "AVG_WAGE_GROWTH".parse::<Measure>().unwrap(),
        Measure::AvgWageGrowth
    );
    assert!("height".parse::<Measure>().is_err());
}

#[test]
fn display_names_match_chart_titles() {
    assert_eq!(Measure::JobGrowth.display_name(), "Job Growth, 2010-2012");
    assert_eq!(
        Measure::AvgWageGrowth.display_name(),
        "Avg Wealth Growth ($M/yr)"
    );
}
