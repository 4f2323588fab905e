//! Row splitter: one trip line becomes a START event and an END event.
//!
//! Splitting is positional on `,` with no quoting support. The input columns
//! are, by index:
//!
//! | idx | column             | idx | column            |
//! |-----|--------------------|-----|-------------------|
//! | 0   | id                 | 6   | end_station_name  |
//! | 1   | duration           | 7   | end_station_id    |
//! | 2   | start_date         | 8   | bike_id           |
//! | 3   | start_station_name | 9   | subscription_type |
//! | 4   | start_station_id   | 10  | zip_code          |
//! | 5   | end_date           |     |                   |

use crate::domain::model::{EventRecord, TripRecord};
use crate::utils::error::Result;

pub fn split_line(line: &str) -> Result<[EventRecord; 2]> {
    TripRecord::parse(line).map(|trip| trip.split())
}

/// Splits every line in order; the first malformed line aborts the whole slice.
pub fn split_lines<S: AsRef<str>>(lines: &[S]) -> Result<Vec<EventRecord>> {
    let mut events = Vec::with_capacity(lines.len() * 2);
    for line in lines {
        events.extend(split_line(line.as_ref())?);
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{EventAction, EVENT_FIELD_COUNT};
    use crate::utils::error::EtlError;

    const SAMPLE: &str = "1,600,2013-08-29,Station A,10,2013-08-29,Station B,20,100,Subscriber,94107";

    fn tuple(event: &EventRecord) -> Vec<&str> {
        event.fields().to_vec()
    }

    #[test]
    fn test_documented_example() {
        let [start, end] = split_line(SAMPLE).unwrap();

        assert_eq!(
            tuple(&start),
            vec!["1", "600", "2013-08-29", "START", "Station A", "10", "100", "Subscriber", "94107"]
        );
        assert_eq!(
            tuple(&end),
            vec!["1", "600", "2013-08-29", "END", "Station B", "20", "100", "Subscriber", "94107"]
        );
    }

    #[test]
    fn test_start_and_end_take_their_own_fields() {
        let line = "7,42,t-start,name-start,id-start,t-end,name-end,id-end,b,s,z";
        let [start, end] = split_line(line).unwrap();

        assert_eq!(start.event_action, EventAction::Start);
        assert_eq!(
            (start.event_time.as_str(), start.station_name.as_str(), start.station_id.as_str()),
            ("t-start", "name-start", "id-start")
        );

        assert_eq!(end.event_action, EventAction::End);
        assert_eq!(
            (end.event_time.as_str(), end.station_name.as_str(), end.station_id.as_str()),
            ("t-end", "name-end", "id-end")
        );
    }

    #[test]
    fn test_shared_fields_are_identical() {
        let [start, end] = split_line(SAMPLE).unwrap();
        assert_eq!(start.id, end.id);
        assert_eq!(start.duration, end.duration);
        assert_eq!(start.bike_id, end.bike_id);
        assert_eq!(start.subscription_type, end.subscription_type);
        assert_eq!(start.zip_code, end.zip_code);
    }

    #[test]
    fn test_every_tuple_has_nine_fields() {
        for event in split_line(SAMPLE).unwrap() {
            assert_eq!(event.fields().len(), EVENT_FIELD_COUNT);
        }
    }

    #[test]
    fn test_empty_fields_are_kept() {
        let [start, _] = split_line("1,,,,,,,,,,").unwrap();
        assert_eq!(start.to_csv_line(), "1,,,START,,,,,");
    }

    #[test]
    fn test_short_line_is_an_error() {
        let err = split_line("1,600,2013-08-29,Station A,10,2013-08-29,Station B,20,100,Subscriber")
            .unwrap_err();
        assert!(matches!(err, EtlError::MalformedRecord { found: 10, .. }));
        assert!(split_line("").is_err());
    }

    #[test]
    fn test_n_lines_give_two_n_events() {
        let lines: Vec<String> = (0..25)
            .map(|i| format!("{i},60,s,A,1,e,B,2,bike{i},Customer,9410{}", i % 10))
            .collect();
        let events = split_lines(&lines).unwrap();
        assert_eq!(events.len(), 50);
        assert_eq!(events[48].id, "24");
        assert_eq!(events[49].event_action, EventAction::End);
    }

    #[test]
    fn test_malformed_line_stops_the_slice() {
        let lines = [SAMPLE, "broken", SAMPLE];
        assert!(split_lines(&lines).is_err());
    }
}
