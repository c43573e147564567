use whiteboard_system::{
    codec, ClientEvent, ConnectionId, Delivery, DrawStrokePayload, EventRouter, RoomStore,
    ServerEvent, Stroke,
};

fn white_stroke() -> Stroke {
    Stroke {
        x1: 0.0,
        y1: 0.0,
        x2: 10.0,
        y2: 10.0,
        color: "#fff".into(),
        width: 5.0,
    }
}

fn events_for(deliveries: &[Delivery], to: &ConnectionId) -> Vec<ServerEvent> {
    deliveries
        .iter()
        .filter(|delivery| delivery.to == *to)
        .map(|delivery| delivery.event.clone())
        .collect()
}

#[test]
fn it_syncs_two_members_and_replays_cleared_board_to_late_joiner() {
    let mut router = EventRouter::new(RoomStore::default());

    let (a, _) = router.connect();
    let (b, _) = router.connect();
    router.handle(a, ClientEvent::JoinBoard("general".into()));
    router.handle(b, ClientEvent::JoinBoard("general".into()));

    let deliveries = router.handle(
        a,
        ClientEvent::DrawStroke(DrawStrokePayload {
            room_id: "general".into(),
            stroke_data: white_stroke(),
        }),
    );
    assert_eq!(
        events_for(&deliveries, &b),
        vec![ServerEvent::DrawStroke(white_stroke())]
    );
    assert!(events_for(&deliveries, &a).is_empty());

    let deliveries = router.handle(b, ClientEvent::ClearBoard("general".into()));
    assert_eq!(events_for(&deliveries, &a), vec![ServerEvent::ClearBoard]);
    assert_eq!(events_for(&deliveries, &b), vec![ServerEvent::ClearBoard]);

    let (c, _) = router.connect();
    let deliveries = router.handle(c, ClientEvent::JoinBoard("general".into()));
    assert_eq!(
        deliveries,
        vec![Delivery {
            to: c,
            event: ServerEvent::LoadHistory(Vec::new()),
        }]
    );
}

#[test]
fn it_keeps_history_equal_to_arrival_order_across_senders() {
    let mut router = EventRouter::new(RoomStore::default());
    let members: Vec<_> = (0..3)
        .map(|_| {
            let (id, _) = router.connect();
            router.handle(id, ClientEvent::JoinBoard("general".into()));
            id
        })
        .collect();

    let mut sent = Vec::new();
    for n in 0..30 {
        let stroke = Stroke {
            x1: n as f64,
            y1: 0.0,
            x2: n as f64 + 1.0,
            y2: 1.0,
            color: "#4cd964".into(),
            width: 2.0,
        };
        let from = members[n % members.len()];
        router.handle(
            from,
            ClientEvent::DrawStroke(DrawStrokePayload {
                room_id: "general".into(),
                stroke_data: stroke.clone(),
            }),
        );
        sent.push(stroke);
    }

    assert_eq!(router.rooms().history("general"), sent);
}

#[test]
fn it_routes_decoded_text_frames() {
    let mut router = EventRouter::new(RoomStore::default());
    let (a, _) = router.connect();
    let (b, _) = router.connect();

    for (from, frame) in &[
        (a, r#"{"event":"join-board","data":"general"}"#),
        (b, r#"{"event":"join-board","data":"general"}"#),
    ] {
        let event = codec::decode_text(frame).expect("");
        router.handle(*from, event);
    }

    let frame = r##"{"event":"cursor-move","data":{"roomId":"general","cursorData":{"x":4,"y":2,"name":"Ana"}}}"##;
    let deliveries = router.handle(a, codec::decode_text(frame).expect(""));
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].to, b);

    let encoded = codec::encode_text(&deliveries[0].event).expect("");
    let value: serde_json::Value = serde_json::from_str(&encoded).expect("");
    assert_eq!(value["event"], "cursor-move");
    assert_eq!(value["data"]["userId"], a.to_string());
    assert_eq!(value["data"]["x"], 4.0);
}
