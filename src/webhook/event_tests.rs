//! Tests for envelope decoding and flattening.

use serde_json::{Value, json};

use super::{
    IncomingContent, IncomingMessage, StatusKind, WebhookEvent, WebhookPayload, normalize,
    parse_payload,
};
use crate::error::ErrorKind;

fn text_message(id: &str, body: &str) -> Value {
    json!({
        "from": "15551234567",
        "id": id,
        "timestamp": "1700000000",
        "type": "text",
        "text": {"body": body}
    })
}

fn status(id: &str, state: &str) -> Value {
    json!({
        "id": id,
        "status": state,
        "timestamp": "1700000001",
        "recipient_id": "15551234567"
    })
}

fn envelope(values: Vec<Vec<Value>>) -> WebhookPayload {
    let entry: Vec<Value> = values
        .into_iter()
        .enumerate()
        .map(|(i, changes)| {
            json!({
                "id": format!("waba-{i}"),
                "changes": changes
                    .into_iter()
                    .map(|value| json!({"field": "messages", "value": value}))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    serde_json::from_value(json!({
        "object": "whatsapp_business_account",
        "entry": entry
    }))
    .unwrap()
}

mod flattening {
    use super::*;

    #[test]
    fn two_entries_with_one_message_each() {
        let payload = envelope(vec![
            vec![json!({"messaging_product": "whatsapp", "messages": [text_message("m1", "first")], "statuses": []})],
            vec![json!({"messaging_product": "whatsapp", "messages": [text_message("m2", "second")]})],
        ]);

        let event = normalize(&payload);

        let ids: Vec<_> = event.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["m1", "m2"]);
        assert!(event.statuses.is_empty());
        assert!(!event.has_errors());
    }

    #[test]
    fn order_follows_entry_then_change_then_item() {
        let payload = envelope(vec![
            vec![
                json!({"messages": [text_message("a1", "x"), text_message("a2", "x")]}),
                json!({"messages": [text_message("b1", "x")], "statuses": [status("s1", "sent")]}),
            ],
            vec![json!({"statuses": [status("s2", "read"), status("s3", "delivered")]})],
        ]);

        let event = WebhookEvent::from_payload(payload);

        let ids: Vec<_> = event.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["a1", "a2", "b1"]);
        let statuses: Vec<_> = event.statuses.iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            [StatusKind::Sent, StatusKind::Read, StatusKind::Delivered]
        );
    }

    #[test]
    fn borrowed_and_owned_flattening_agree() {
        let payload = envelope(vec![vec![json!({
            "messages": [text_message("m1", "hi")],
            "statuses": [status("s1", "failed")],
            "errors": [{"code": 131_000, "title": "Something went wrong"}]
        })]]);

        assert_eq!(normalize(&payload), WebhookEvent::from_payload(payload));
    }

    #[test]
    fn absent_and_null_lists_are_empty() {
        let payload = parse_payload(
            br#"{"object":"whatsapp_business_account","entry":[
                {"id":"1","changes":[{"field":"messages","value":{"messages":null}}]},
                {"id":"2"},
                {"id":"3","changes":null}
            ]}"#,
        )
        .unwrap();

        let event = normalize(&payload);

        assert!(event.is_empty());
    }

    #[test]
    fn empty_object_is_an_empty_event() {
        let payload = parse_payload(b"{}").unwrap();

        assert!(normalize(&payload).is_empty());
    }

    #[test]
    fn errors_are_collected() {
        let payload = envelope(vec![vec![json!({
            "errors": [{"code": 130_429, "title": "Rate limit hit", "message": "Too many messages"}]
        })]]);

        let event = normalize(&payload);

        assert!(event.has_errors());
        assert_eq!(event.errors[0].code, Some(130_429));
        assert_eq!(event.errors[0].message.as_deref(), Some("Too many messages"));
    }
}

mod message_content {
    use super::*;

    fn single(message: Value) -> IncomingMessage {
        let payload = envelope(vec![vec![json!({"messages": [message]})]]);
        WebhookEvent::from_payload(payload).messages.remove(0)
    }

    #[test]
    fn text_body_is_exposed() {
        let message = single(text_message("m1", "hello there"));

        assert_eq!(message.text(), Some("hello there"));
        assert_eq!(message.kind(), "text");
        assert!(!message.is_reply());
    }

    #[test]
    fn reply_context_is_detected() {
        let mut raw = text_message("m2", "yes");
        raw["context"] = json!({"from": "15550001111", "id": "wamid.original"});

        let message = single(raw);

        assert!(message.is_reply());
        assert_eq!(
            message.context.unwrap().id.as_deref(),
            Some("wamid.original")
        );
    }

    #[test]
    fn image_message_exposes_media_id() {
        let message = single(json!({
            "from": "1", "id": "m3", "timestamp": "1", "type": "image",
            "image": {"id": "media-9", "mime_type": "image/jpeg", "caption": "look"}
        }));

        assert_eq!(message.media_id(), Some("media-9"));
        assert!(matches!(
            message.content,
            IncomingContent::Image { ref image } if image.caption.as_deref() == Some("look")
        ));
    }

    #[test]
    fn interactive_button_reply_is_parsed() {
        let message = single(json!({
            "from": "1", "id": "m4", "timestamp": "1", "type": "interactive",
            "interactive": {"type": "button_reply", "button_reply": {"id": "yes", "title": "Yes"}}
        }));

        let IncomingContent::Interactive { interactive } = message.content else {
            panic!("expected interactive content");
        };
        assert_eq!(interactive.choice().unwrap().id, "yes");
    }

    #[test]
    fn location_is_parsed() {
        let message = single(json!({
            "from": "1", "id": "m5", "timestamp": "1", "type": "location",
            "location": {"latitude": 52.52, "longitude": 13.405, "name": "Berlin"}
        }));

        let IncomingContent::Location { location } = message.content else {
            panic!("expected location content");
        };
        assert!((location.latitude - 52.52).abs() < f64::EPSILON);
        assert_eq!(location.name.as_deref(), Some("Berlin"));
    }

    #[test]
    fn unknown_type_is_unsupported_not_an_error() {
        let message = single(json!({
            "from": "1", "id": "m6", "timestamp": "1", "type": "order",
            "order": {"catalog_id": "c1"}
        }));

        assert_eq!(message.content, IncomingContent::Unsupported);
        assert_eq!(message.kind(), "unsupported");
        assert_eq!(message.text(), None);
    }

    #[test]
    fn voice_note_exposes_media_id() {
        let message = single(json!({
            "from": "1", "id": "m7", "timestamp": "1", "type": "voice",
            "voice": {"id": "media-voice", "mime_type": "audio/ogg; codecs=opus"}
        }));

        assert_eq!(message.kind(), "voice");
        assert_eq!(message.media_id(), Some("media-voice"));
    }

    #[test]
    fn per_message_errors_survive_reserialization() {
        let message = single(json!({
            "from": "1", "id": "m8", "timestamp": "1", "type": "unsupported",
            "errors": [{
                "code": 131_051,
                "title": "Message type unknown",
                "error_data": {"details": "Message type is currently not supported."}
            }]
        }));

        assert_eq!(message.content, IncomingContent::Unsupported);
        assert_eq!(message.errors[0].code, Some(131_051));

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["type"], "unsupported");
        assert_eq!(value["errors"][0]["code"], 131_051);
        let again: IncomingMessage = serde_json::from_value(value).unwrap();
        assert_eq!(again, message);
    }

    #[test]
    fn messages_without_errors_serialize_without_the_field() {
        let value = serde_json::to_value(single(text_message("m9", "plain"))).unwrap();

        assert!(value.get("errors").is_none());
        assert_eq!(value["text"]["body"], "plain");
    }

    #[test]
    fn unknown_status_value_is_preserved_as_unknown() {
        let payload = envelope(vec![vec![json!({"statuses": [status("s1", "deleted")]})]]);

        let event = normalize(&payload);

        assert_eq!(event.statuses[0].status, StatusKind::Unknown);
    }
}

mod decoding {
    use super::*;

    #[test]
    fn invalid_json_is_webhook_error() {
        let err = parse_payload(b"{not json").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Webhook);
    }

    #[test]
    fn bare_message_body_does_not_drop_its_neighbours() {
        let payload = parse_payload(
            br#"{"object":"whatsapp_business_account","entry":[{"id":"waba","changes":[
                {"field":"messages","value":{"messages":[
                    {"from":"15551234567","id":"wamid.good","timestamp":"1700000000",
                     "type":"text","text":{"body":"still here"}},
                    {"from":"15551234567","id":"wamid.bare","timestamp":"1700000001",
                     "type":"text"},
                    {"from":"15551234567","id":"wamid.badimage","timestamp":"1700000002",
                     "type":"image","image":{"mime_type":"image/jpeg"}}
                ]}}]}]}"#,
        )
        .unwrap();

        let event = normalize(&payload);

        let ids: Vec<_> = event.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["wamid.good", "wamid.bare", "wamid.badimage"]);
        assert_eq!(event.messages[0].text(), Some("still here"));
        assert_eq!(event.messages[1].content, IncomingContent::Unsupported);
        assert_eq!(event.messages[2].media_id(), None);
    }

    #[test]
    fn message_without_type_is_unsupported() {
        let payload = envelope(vec![vec![json!({"messages": [{"id": "m1", "from": "1"}]})]]);

        let event = normalize(&payload);

        assert_eq!(event.messages[0].kind(), "unsupported");
        assert_eq!(event.messages[0].timestamp, "");
    }

    #[test]
    fn metadata_and_contacts_are_kept() {
        let payload = envelope(vec![vec![json!({
            "messaging_product": "whatsapp",
            "metadata": {"display_phone_number": "15550000000", "phone_number_id": "123"},
            "contacts": [{"profile": {"name": "Ada"}, "wa_id": "15551234567"}],
            "messages": []
        })]]);

        let value = &payload.entry[0].changes[0].value;
        assert_eq!(value.metadata.as_ref().unwrap().phone_number_id, "123");
        assert_eq!(
            value.contacts[0].profile.as_ref().unwrap().name.as_deref(),
            Some("Ada")
        );
    }
}
