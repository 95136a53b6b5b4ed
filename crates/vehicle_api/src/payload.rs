use serde_json::{Map, Value};

pub const COMMAND_DOOR_LOCK: &str = "door_lock";
pub const COMMAND_DOOR_UNLOCK: &str = "door_unlock";
pub const COMMAND_SET_SENTRY_MODE: &str = "set_sentry_mode";

/// A named proxy command and its JSON parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRequest {
    name: String,
    parameters: Map<String, Value>,
}

impl CommandRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Map::new(),
        }
    }

    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn door_lock() -> Self {
        Self::new(COMMAND_DOOR_LOCK)
    }

    pub fn door_unlock() -> Self {
        Self::new(COMMAND_DOOR_UNLOCK)
    }

    pub fn set_sentry_mode(on: bool) -> Self {
        Self::new(COMMAND_SET_SENTRY_MODE).with_parameter("on", on)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }

    /// Request body; an empty parameter set serializes as `{}`.
    pub fn body(&self) -> Value {
        Value::Object(self.parameters.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_parameters_serialize_as_empty_object() {
        assert_eq!(CommandRequest::door_lock().body(), json!({}));
    }

    #[test]
    fn sentry_mode_carries_on_flag() {
        let request = CommandRequest::set_sentry_mode(false);
        assert_eq!(request.name(), "set_sentry_mode");
        assert_eq!(request.body(), json!({"on": false}));
    }
}
