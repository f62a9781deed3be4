//! Tests for the event sinks, the scripted command source, and the error
//! type's reporting surface.

use matchbook::{
    Command, CommandSource, EngineError, Event, MatchingEngine, ReadResult, RecordingSink,
    ScriptedSource, Side, StreamSink,
};
use std::sync::Arc;

#[test]
fn stream_sink_formats_one_line_per_event() {
    let sink = StreamSink::new(Vec::new());

    sink_events(&sink);

    let output = String::from_utf8(sink.into_inner()).expect("output must be utf-8");
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines,
        vec![
            "A 10 AAPL 100 5 S 111",
            "E 10 20 1 100 5 222",
            "X 30 A 333",
            "X 31 R 444",
        ]
    );
}

fn sink_events(sink: &dyn matchbook::EventSink) {
    sink.order_added(10, "AAPL", 100, 5, true, 111);
    sink.order_executed(10, 20, 1, 100, 5, 222);
    sink.order_deleted(30, true, 333);
    sink.order_deleted(31, false, 444);
}

#[test]
fn recording_sink_preserves_emission_order() {
    let sink = RecordingSink::new();
    assert!(sink.is_empty());

    sink_events(&sink);

    let events = sink.events();
    assert_eq!(sink.len(), 4);
    assert_eq!(
        events[0],
        Event::Added {
            order_id: 10,
            instrument: "AAPL".to_string(),
            price: 100,
            quantity: 5,
            is_sell: true,
            timestamp: 111,
        }
    );
    assert_eq!(
        events[1],
        Event::Executed {
            resting_id: 10,
            active_id: 20,
            execution_id: 1,
            price: 100,
            quantity: 5,
            timestamp: 222,
        }
    );
    assert_eq!(
        events[3],
        Event::Deleted {
            order_id: 31,
            accepted: false,
            timestamp: 444,
        }
    );
}

#[test]
fn events_round_trip_through_serde() {
    let event = Event::Executed {
        resting_id: 1,
        active_id: 2,
        execution_id: 3,
        price: 4,
        quantity: 5,
        timestamp: 6,
    };
    let json = serde_json::to_string(&event).expect("event must serialize");
    let back: Event = serde_json::from_str(&json).expect("event must deserialize");
    assert_eq!(event, back);
}

#[test]
fn scripted_source_replays_then_ends() {
    let mut source = ScriptedSource::new(vec![
        Command::Cancel { order_id: 1 },
        Command::Cancel { order_id: 2 },
    ]);

    assert_eq!(
        source.read_command(),
        ReadResult::Command(Command::Cancel { order_id: 1 })
    );
    assert_eq!(
        source.read_command(),
        ReadResult::Command(Command::Cancel { order_id: 2 })
    );
    assert_eq!(source.read_command(), ReadResult::EndOfFile);
    assert_eq!(source.read_command(), ReadResult::EndOfFile);
}

#[test]
fn worker_survives_rejected_commands() {
    // A scripted connection mixing invalid submits with a valid flow: the
    // worker logs rejects and keeps going.
    let sink = Arc::new(RecordingSink::new());
    let engine = Arc::new(MatchingEngine::new(Arc::clone(&sink) as Arc<dyn matchbook::EventSink>));

    let source = ScriptedSource::new(vec![
        Command::Submit {
            side: Side::Buy,
            order_id: 1,
            instrument: "AAPL".to_string(),
            price: 0,
            quantity: 5,
        },
        Command::Submit {
            side: Side::Sell,
            order_id: 2,
            instrument: "AAPL".to_string(),
            price: 100,
            quantity: 5,
        },
        Command::Cancel { order_id: 2 },
    ]);
    engine.accept(source).join().expect("worker panicked");

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], Event::Added { order_id: 2, .. }));
    assert!(matches!(
        events[1],
        Event::Deleted {
            order_id: 2,
            accepted: true,
            ..
        }
    ));
}

#[test]
fn engine_error_display() {
    assert_eq!(
        EngineError::InvalidPrice(0).to_string(),
        "Invalid order price: 0"
    );
    assert_eq!(
        EngineError::InvalidQuantity(0).to_string(),
        "Invalid order quantity: 0"
    );
    assert_eq!(
        EngineError::DuplicateOrderId(7).to_string(),
        "Duplicate order id: 7"
    );
}
