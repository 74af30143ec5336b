//! ECS event to Slack message formatting
//!
//! Each event kind is described by an ordered list of field producers. A
//! producer looks at the event and either yields a field or declines, so
//! conditional fields sit in the list at the position they render in.

use serde_json::Value;

use super::{Block, SlackMessage, TextObject};
use crate::event::{self, EventKind, detail, last_colon_segment, last_path_segment, render};

/// Cluster name used when the event carries no `clusterArn`
pub const UNKNOWN_CLUSTER: &str = "UnknownCluster";

/// Knobs that change what gets rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatOptions {
    /// Render `ECS Service Action` events instead of suppressing them
    pub service_actions: bool,
}

type FieldProducer = fn(&Value) -> Option<TextObject>;

const TASK_STATE_CHANGE: &[FieldProducer] = &[
    event_type,
    cluster_field,
    service,
    task,
    desired_status,
    last_status,
    stopped_reason,
];

const DEPLOYMENT_STATE_CHANGE: &[FieldProducer] = &[event_type, level, status, deployment, reason];

const SERVICE_ACTION: &[FieldProducer] = &[event_type, level, status];

/// Build the Slack message for an inbound event.
///
/// Never fails: unknown kinds fall back to a preformatted dump of the whole
/// event, and missing fields render as placeholders.
pub fn format(event: &Value, options: &FormatOptions) -> SlackMessage {
    let kind = EventKind::of(event);
    log::debug!("Formatting event kind {:?}", kind);

    let block = match kind {
        EventKind::TaskStateChange => Some(section(event, TASK_STATE_CHANGE)),
        EventKind::DeploymentStateChange => Some(section(event, DEPLOYMENT_STATE_CHANGE)),
        EventKind::ServiceAction if options.service_actions => Some(section(event, SERVICE_ACTION)),
        EventKind::ServiceAction => {
            log::info!("Suppressing ECS Service Action event");
            None
        }
        EventKind::Other => Some(fallback(event)),
    };

    SlackMessage {
        blocks: block.into_iter().collect(),
    }
}

fn section(event: &Value, producers: &[FieldProducer]) -> Block {
    Block::section(producers.iter().filter_map(|produce| produce(event)).collect())
}

fn fallback(event: &Value) -> Block {
    // Serializing a Value does not fail
    let dump = serde_json::to_string_pretty(&event::normalize_numbers(event))
        .expect("serializing a JSON value cannot fail");
    Block::preformatted(dump)
}

fn field(label: &str, value: &str) -> Option<TextObject> {
    Some(TextObject::labeled(label, value))
}

fn event_type(event: &Value) -> Option<TextObject> {
    field("Event Type", &render(event::lookup(event, &[event::DETAIL_TYPE])))
}

fn cluster_field(event: &Value) -> Option<TextObject> {
    field("Cluster", &cluster(event))
}

fn service(event: &Value) -> Option<TextObject> {
    let group = segment_or_undefined(last_colon_segment(detail(event, "group")));
    field("Service", &format!("{}/{}", cluster(event), group))
}

fn task(event: &Value) -> Option<TextObject> {
    field("Task", &segment_or_undefined(last_path_segment(detail(event, "taskArn"))))
}

fn desired_status(event: &Value) -> Option<TextObject> {
    field("Desired Status", &render(detail(event, "desiredStatus")))
}

fn last_status(event: &Value) -> Option<TextObject> {
    field("Last Status", &render(detail(event, "lastStatus")))
}

/// Only present on stopped tasks
fn stopped_reason(event: &Value) -> Option<TextObject> {
    let reason = detail(event, "stoppedReason");
    if !event::is_truthy(reason) {
        return None;
    }
    field("Reason", &render(reason))
}

fn level(event: &Value) -> Option<TextObject> {
    field("Level", &render(detail(event, "eventType")))
}

fn status(event: &Value) -> Option<TextObject> {
    field("Status", &render(detail(event, "eventName")))
}

fn deployment(event: &Value) -> Option<TextObject> {
    field("Deployment", &render(detail(event, "deploymentId")))
}

fn reason(event: &Value) -> Option<TextObject> {
    field("Reason", &render(detail(event, "reason")))
}

fn cluster(event: &Value) -> String {
    last_path_segment(detail(event, "clusterArn"))
        .unwrap_or(UNKNOWN_CLUSTER)
        .to_string()
}

fn segment_or_undefined(segment: Option<&str>) -> String {
    segment.unwrap_or("undefined").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slack::{RichTextElement, RichTextSpan};
    use serde_json::json;

    fn fields(message: &SlackMessage) -> Vec<String> {
        assert_eq!(message.blocks.len(), 1, "expected exactly one block");
        match &message.blocks[0] {
            Block::Section { fields } => fields.iter().map(|f| f.text.clone()).collect(),
            other => panic!("expected section block, got {:?}", other),
        }
    }

    fn labels(message: &SlackMessage) -> Vec<String> {
        fields(message)
            .iter()
            .map(|t| t.split(":*\n").next().unwrap().trim_start_matches('*').to_string())
            .collect()
    }

    fn preformatted_text(message: &SlackMessage) -> String {
        assert_eq!(message.blocks.len(), 1, "expected exactly one block");
        match &message.blocks[0] {
            Block::RichText { elements } => {
                assert_eq!(elements.len(), 1);
                let RichTextElement::RichTextPreformatted { elements } = &elements[0];
                assert_eq!(elements.len(), 1);
                let RichTextSpan::Text { text } = &elements[0];
                text.clone()
            }
            other => panic!("expected rich_text block, got {:?}", other),
        }
    }

    fn task_event(stopped_reason: Option<&str>) -> Value {
        let mut event = json!({
            "version": "0",
            "detail-type": "ECS Task State Change",
            "source": "aws.ecs",
            "detail": {
                "clusterArn": "arn:aws:ecs:us-east-1:123456789012:cluster/prod",
                "group": "service:web-api",
                "taskArn": "arn:aws:ecs:us-east-1:123456789012:task/prod/0f9c1a2b3c",
                "desiredStatus": "STOPPED",
                "lastStatus": "DEPROVISIONING"
            }
        });
        if let Some(reason) = stopped_reason {
            event["detail"]["stoppedReason"] = json!(reason);
        }
        event
    }

    #[test]
    fn test_task_state_change_fields_in_order() {
        let message = format(&task_event(None), &FormatOptions::default());
        assert_eq!(
            fields(&message),
            vec![
                "*Event Type:*\nECS Task State Change",
                "*Cluster:*\nprod",
                "*Service:*\nprod/web-api",
                "*Task:*\n0f9c1a2b3c",
                "*Desired Status:*\nSTOPPED",
                "*Last Status:*\nDEPROVISIONING",
            ]
        );
    }

    #[test]
    fn test_task_state_change_reason_appended_last() {
        let message = format(
            &task_event(Some("Essential container in task exited")),
            &FormatOptions::default(),
        );
        assert_eq!(
            labels(&message),
            vec![
                "Event Type",
                "Cluster",
                "Service",
                "Task",
                "Desired Status",
                "Last Status",
                "Reason"
            ]
        );
        assert_eq!(
            fields(&message).last().unwrap(),
            "*Reason:*\nEssential container in task exited"
        );
    }

    #[test]
    fn test_task_state_change_empty_reason_omitted() {
        let message = format(&task_event(Some("")), &FormatOptions::default());
        assert_eq!(fields(&message).len(), 6);
        assert!(!labels(&message).contains(&"Reason".to_string()));
    }

    #[test]
    fn test_task_state_change_null_reason_omitted() {
        let mut event = task_event(None);
        event["detail"]["stoppedReason"] = Value::Null;
        let message = format(&event, &FormatOptions::default());
        assert_eq!(fields(&message).len(), 6);
    }

    #[test]
    fn test_task_state_change_missing_cluster_uses_sentinel() {
        let mut event = task_event(None);
        event["detail"].as_object_mut().unwrap().remove("clusterArn");
        let message = format(&event, &FormatOptions::default());
        let texts = fields(&message);
        assert_eq!(texts[1], "*Cluster:*\nUnknownCluster");
        assert_eq!(texts[2], "*Service:*\nUnknownCluster/web-api");
    }

    #[test]
    fn test_task_state_change_without_detail() {
        let event = json!({"detail-type": "ECS Task State Change"});
        let message = format(&event, &FormatOptions::default());
        assert_eq!(
            fields(&message),
            vec![
                "*Event Type:*\nECS Task State Change",
                "*Cluster:*\nUnknownCluster",
                "*Service:*\nUnknownCluster/undefined",
                "*Task:*\nundefined",
                "*Desired Status:*\nundefined",
                "*Last Status:*\nundefined",
            ]
        );
    }

    #[test]
    fn test_task_state_change_group_without_colon() {
        let mut event = task_event(None);
        event["detail"]["group"] = json!("standalone");
        let message = format(&event, &FormatOptions::default());
        assert_eq!(fields(&message)[2], "*Service:*\nprod/standalone");
    }

    #[test]
    fn test_deployment_state_change_example() {
        let event = json!({
            "detail-type": "ECS Deployment State Change",
            "detail": {
                "eventType": "INFO",
                "eventName": "SERVICE_DEPLOYMENT_COMPLETED",
                "deploymentId": "d-123",
                "reason": "steady state"
            }
        });
        let message = format(&event, &FormatOptions::default());
        assert_eq!(
            fields(&message),
            vec![
                "*Event Type:*\nECS Deployment State Change",
                "*Level:*\nINFO",
                "*Status:*\nSERVICE_DEPLOYMENT_COMPLETED",
                "*Deployment:*\nd-123",
                "*Reason:*\nsteady state",
            ]
        );
    }

    #[test]
    fn test_deployment_state_change_always_five_fields() {
        let event = json!({"detail-type": "ECS Deployment State Change", "detail": {}});
        let message = format(&event, &FormatOptions::default());
        assert_eq!(labels(&message), vec!["Event Type", "Level", "Status", "Deployment", "Reason"]);
        assert_eq!(fields(&message)[4], "*Reason:*\nundefined");
    }

    #[test]
    fn test_service_action_suppressed_by_default() {
        let event = json!({
            "detail-type": "ECS Service Action",
            "detail": {"eventType": "INFO", "eventName": "SERVICE_STEADY_STATE"}
        });
        let message = format(&event, &FormatOptions::default());
        assert!(message.is_empty());
        assert_eq!(serde_json::to_string(&message).unwrap(), r#"{"blocks":[]}"#);
    }

    #[test]
    fn test_service_action_rendered_when_enabled() {
        let event = json!({
            "detail-type": "ECS Service Action",
            "detail": {"eventType": "WARN", "eventName": "SERVICE_TASK_START_IMPAIRED"}
        });
        let options = FormatOptions { service_actions: true };
        let message = format(&event, &options);
        assert_eq!(
            fields(&message),
            vec![
                "*Event Type:*\nECS Service Action",
                "*Level:*\nWARN",
                "*Status:*\nSERVICE_TASK_START_IMPAIRED",
            ]
        );
    }

    #[test]
    fn test_unknown_event_falls_back_to_pretty_dump() {
        let event = json!({
            "detail-type": "Custom Unknown Event",
            "detail": {"anything": [1, 2, {"nested": true}]}
        });
        let message = format(&event, &FormatOptions::default());
        assert_eq!(preformatted_text(&message), serde_json::to_string_pretty(&event).unwrap());
    }

    #[test]
    fn test_fallback_uses_two_space_indent_and_input_order() {
        let event: Value = serde_json::from_str(r#"{"source":"aws.ecs","detail-type":"Other","detail":{"b":1,"a":2}}"#).unwrap();
        let message = format(&event, &FormatOptions::default());
        assert_eq!(
            preformatted_text(&message),
            "{\n  \"source\": \"aws.ecs\",\n  \"detail-type\": \"Other\",\n  \"detail\": {\n    \"b\": 1,\n    \"a\": 2\n  }\n}"
        );
    }

    #[test]
    fn test_fallback_writes_integral_floats_as_integers() {
        let event: Value = serde_json::from_str(r#"{"detail-type":"X","a":1.0,"b":1e2,"c":0.5}"#).unwrap();
        let message = format(&event, &FormatOptions::default());
        assert_eq!(
            preformatted_text(&message),
            "{\n  \"detail-type\": \"X\",\n  \"a\": 1,\n  \"b\": 100,\n  \"c\": 0.5\n}"
        );
    }

    #[test]
    fn test_missing_discriminator_falls_back() {
        let event = json!({"detail": {"clusterArn": "arn:aws:ecs:x:1:cluster/prod"}});
        let message = format(&event, &FormatOptions::default());
        assert_eq!(preformatted_text(&message), serde_json::to_string_pretty(&event).unwrap());
    }

    #[test]
    fn test_non_object_event_falls_back() {
        for event in [json!(null), json!("text"), json!([1, 2]), json!(5)] {
            let message = format(&event, &FormatOptions::default());
            assert_eq!(preformatted_text(&message), serde_json::to_string_pretty(&event).unwrap());
        }
    }

    #[test]
    fn test_format_is_idempotent() {
        let options = FormatOptions::default();
        for event in [
            task_event(Some("Task stopped by user")),
            json!({"detail-type": "ECS Deployment State Change", "detail": {"eventType": "ERROR"}}),
            json!({"detail-type": "Custom Unknown Event", "detail": {"x": 1}}),
        ] {
            let first = serde_json::to_string(&format(&event, &options)).unwrap();
            let second = serde_json::to_string(&format(&event, &options)).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_non_string_fields_render_as_json_text() {
        let event = json!({
            "detail-type": "ECS Deployment State Change",
            "detail": {"eventType": null, "eventName": 7, "deploymentId": {"id": "d-1"}, "reason": false}
        });
        let message = format(&event, &FormatOptions::default());
        assert_eq!(
            fields(&message)[1..],
            [
                "*Level:*\nnull",
                "*Status:*\n7",
                "*Deployment:*\n{\"id\":\"d-1\"}",
                "*Reason:*\nfalse"
            ]
        );
    }

    #[test]
    fn test_integral_float_fields_render_as_integers() {
        let event = json!({
            "detail-type": "ECS Task State Change",
            "detail": {"desiredStatus": 2.0, "lastStatus": 1.25}
        });
        let message = format(&event, &FormatOptions::default());
        assert_eq!(fields(&message)[4..6], ["*Desired Status:*\n2", "*Last Status:*\n1.25"]);
    }
}
