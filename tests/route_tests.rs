//! Route table and schedule tests

use chrono::{DateTime, Local, TimeZone};
use transit_sim::simulation::{
    departure_timestamp, stamp_schedule, Clock, Direction, FixedClock, RouteTable, Stop,
};

fn three_stops() -> Vec<Stop> {
    vec![
        Stop::new("A", 0.0, "a"),
        Stop::new("B", 5.0, "b"),
        Stop::new("C", 10.0, "c"),
    ]
}

fn arrivals(route: &RouteTable) -> Vec<f64> {
    route.stops.iter().map(|s| s.arrival_secs).collect()
}

fn names(route: &RouteTable) -> Vec<&str> {
    route.stops.iter().map(|s| s.name.as_str()).collect()
}

fn eight_am() -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2024, 1, 15, 8, 0, 0)
        .single()
        .expect("unambiguous local time")
}

#[test]
fn test_outbound_keeps_order_and_converts_minutes() {
    let route = RouteTable::build(&three_stops(), Direction::Outbound);
    assert_eq!(arrivals(&route), vec![0.0, 300.0, 600.0]);
    assert_eq!(names(&route), vec!["A", "B", "C"]);
    assert_eq!(route.destination_name(), "C");
}

#[test]
fn test_inbound_reverses_order() {
    let route = RouteTable::build(&three_stops(), Direction::Inbound);
    assert_eq!(arrivals(&route), vec![0.0, 300.0, 600.0]);
    assert_eq!(names(&route), vec!["C", "B", "A"]);
    assert_eq!(route.destination_name(), "A");
    assert_eq!(route.stops[0].audio_key, "c");
}

#[test]
fn test_inbound_times_measured_from_far_terminus() {
    let stops = vec![
        Stop::new("Depot", 0.0, ""),
        Stop::new("Market", 2.0, ""),
        Stop::new("Hospital", 7.0, ""),
    ];
    let route = RouteTable::build(&stops, Direction::Inbound);
    assert_eq!(arrivals(&route), vec![0.0, 300.0, 420.0]);
    assert_eq!(names(&route), vec!["Hospital", "Market", "Depot"]);
}

#[test]
fn test_both_directions_take_the_same_time() {
    let lines = vec![
        three_stops(),
        vec![Stop::new("X", 1.0, ""), Stop::new("Y", 4.5, "")],
        vec![
            Stop::new("P", 0.0, ""),
            Stop::new("Q", 0.5, ""),
            Stop::new("R", 0.5, ""),
            Stop::new("S", 12.25, ""),
        ],
        vec![Stop::new("Only", 3.0, "")],
    ];

    for stops in lines {
        let outbound = RouteTable::build(&stops, Direction::Outbound);
        let inbound = RouteTable::build(&stops, Direction::Inbound);
        assert_eq!(outbound.total_duration(), inbound.total_duration());
    }
}

#[test]
fn test_inbound_starts_where_outbound_starts() {
    // The first stop is not at zero, so both directions start one minute in
    let stops = vec![Stop::new("X", 1.0, ""), Stop::new("Y", 4.5, "")];

    let outbound = RouteTable::build(&stops, Direction::Outbound);
    let inbound = RouteTable::build(&stops, Direction::Inbound);
    assert_eq!(arrivals(&outbound), vec![60.0, 270.0]);
    assert_eq!(arrivals(&inbound), vec![60.0, 270.0]);
    assert_eq!(names(&inbound), vec!["Y", "X"]);
}

#[test]
fn test_arrivals_never_decrease() {
    // Out-of-order and negative offsets are repaired rather than trusted
    let stops = vec![
        Stop::new("A", -2.0, ""),
        Stop::new("B", 5.0, ""),
        Stop::new("C", 3.0, ""),
        Stop::new("D", 10.0, ""),
    ];

    for direction in [Direction::Outbound, Direction::Inbound] {
        let route = RouteTable::build(&stops, direction);
        for pair in route.stops.windows(2) {
            assert!(pair[0].arrival_secs <= pair[1].arrival_secs);
        }
        assert_eq!(route.total_duration(), 600.0);
    }

    let outbound = RouteTable::build(&stops, Direction::Outbound);
    assert_eq!(arrivals(&outbound), vec![0.0, 300.0, 300.0, 600.0]);
}

#[test]
fn test_empty_line_builds_empty_route() {
    let route = RouteTable::build(&[], Direction::Inbound);
    assert!(route.is_empty());
    assert_eq!(route.total_duration(), 0.0);
    assert_eq!(route.destination_name(), "");
    assert!(!route.is_last(0));
}

#[test]
fn test_schedule_adds_arrival_to_departure() {
    let mut route = RouteTable::build(&three_stops(), Direction::Outbound);
    assert_eq!(route.stops[1].scheduled_string(), "");

    stamp_schedule(&mut route, eight_am());

    let strings: Vec<String> = route.stops.iter().map(|s| s.scheduled_string()).collect();
    assert_eq!(strings, vec!["08:00", "08:05", "08:10"]);
    assert_eq!(
        route.stops[2].scheduled.expect("stamped") - eight_am(),
        chrono::TimeDelta::seconds(600)
    );
}

#[test]
fn test_schedule_out_of_range_is_left_blank() {
    let stops = vec![Stop::new("A", 0.0, ""), Stop::new("B", 1e12, "")];
    let mut route = RouteTable::build(&stops, Direction::Outbound);

    stamp_schedule(&mut route, eight_am());

    assert_eq!(route.stops[0].scheduled_string(), "08:00");
    assert_eq!(route.stops[1].scheduled, None);
    assert_eq!(route.stops[1].scheduled_string(), "");
}

struct BrokenClock;

impl Clock for BrokenClock {
    fn now(&self) -> anyhow::Result<DateTime<Local>> {
        anyhow::bail!("no clock")
    }
}

#[test]
fn test_departure_falls_back_to_epoch() {
    let departure = departure_timestamp(&BrokenClock);
    assert_eq!(departure.timestamp(), 0);

    let departure = departure_timestamp(&FixedClock(eight_am()));
    assert_eq!(departure, eight_am());
}
