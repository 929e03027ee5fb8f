//! GetEventProperties operation for the event service

use xmltree::Element;

use crate::operation::{child_text, children_text, OnvifOperation};
use crate::value::{ToValue, Value};
use crate::xsd::parse_boolean;
use crate::{ApiError, Service};

/// GetEventProperties operation
pub struct GetEventPropertiesOperation;

/// GetEventProperties takes no parameters
#[derive(Debug, Clone, Default)]
pub struct GetEventPropertiesRequest;

/// Supported event topics and dialects reported by the device
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventProperties {
    pub topic_namespace_locations: Vec<String>,
    /// Whether the topic set is fixed for the lifetime of the device
    pub fixed_topic_set: bool,
    /// Raw `wstop:TopicSet` tree
    pub topic_set: Option<Element>,
    pub topic_expression_dialects: Vec<String>,
    pub message_content_filter_dialects: Vec<String>,
    pub message_content_schema_locations: Vec<String>,
}

impl EventProperties {
    /// Concrete topic paths in the topic set, e.g. `tns1:RuleEngine/CellMotionDetector/Motion`
    ///
    /// A node is a topic when its `wstop:topic` attribute is true; intermediate
    /// nodes only contribute their name to the path.
    pub fn topics(&self) -> Vec<String> {
        let mut topics = Vec::new();
        if let Some(topic_set) = &self.topic_set {
            for child in topic_set.children.iter().filter_map(|n| n.as_element()) {
                let root = match &child.prefix {
                    Some(prefix) => format!("{}:{}", prefix, child.name),
                    None => child.name.clone(),
                };
                collect_topics(child, root, &mut topics);
            }
        }
        topics
    }
}

fn collect_topics(node: &Element, path: String, topics: &mut Vec<String>) {
    if node.attributes.get("topic").map_or(false, |v| parse_boolean(v)) {
        topics.push(path.clone());
    }
    for child in node.children.iter().filter_map(|n| n.as_element()) {
        // Message descriptions live next to the topic nodes but are not topics
        if child.name == "MessageDescription" || child.name == "Documentation" {
            continue;
        }
        collect_topics(child, format!("{}/{}", path, child.name), topics);
    }
}

impl ToValue for EventProperties {
    fn to_value(&self) -> Value {
        Value::map()
            .with("topic_namespace_locations", self.topic_namespace_locations.clone())
            .with("fixed_topic_set", self.fixed_topic_set)
            .with("topics", self.topics())
            .with("topic_set", self.topic_set.clone())
            .with("topic_expression_dialects", self.topic_expression_dialects.clone())
            .with(
                "message_content_filter_dialects",
                self.message_content_filter_dialects.clone(),
            )
            .with(
                "message_content_schema_locations",
                self.message_content_schema_locations.clone(),
            )
    }
}

impl OnvifOperation for GetEventPropertiesOperation {
    type Request = GetEventPropertiesRequest;
    type Response = EventProperties;

    const SERVICE: Service = Service::Events;
    const ACTION: &'static str = "GetEventProperties";

    fn build_payload(_request: &Self::Request) -> String {
        String::new()
    }

    fn parse_response(xml: &Element) -> Result<Self::Response, ApiError> {
        let fixed_topic_set = child_text(xml, "FixedTopicSet")
            .ok_or_else(|| ApiError::ParseError("Missing FixedTopicSet element".to_string()))?;

        Ok(EventProperties {
            topic_namespace_locations: children_text(xml, "TopicNamespaceLocation"),
            fixed_topic_set: parse_boolean(&fixed_topic_set),
            topic_set: xml.get_child("TopicSet").cloned(),
            topic_expression_dialects: children_text(xml, "TopicExpressionDialect"),
            message_content_filter_dialects: children_text(xml, "MessageContentFilterDialect"),
            message_content_schema_locations: children_text(xml, "MessageContentSchemaLocation"),
        })
    }
}
