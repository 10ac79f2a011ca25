//! The closed action vocabulary accepted from decision logic
//!
//! Bots answer with a loosely-typed JSON value of the form
//! `{"action": "MOVE", "param": [dx, dy]}`. Anything that does not parse
//! into [`Action`] with finite numbers is a no-op.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "param", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Engine force along a direction (normalized by the engine)
    Move(Vec2),
    /// Fire along an absolute angle in degrees
    Shoot(f32),
    /// Clear velocity immediately
    Stop,
    /// Move and fire in the same tick
    MoveAndShoot(Vec2, f32),
}

impl Action {
    /// Validate a raw decision output
    pub fn parse(value: Value) -> Option<Action> {
        if value.is_null() {
            return None;
        }
        let action: Action = serde_json::from_value(value).ok()?;
        action.is_finite().then_some(action)
    }

    /// Raw form, as a bot would return it
    pub fn into_value(self) -> Value {
        // Finite floats and fixed tags always serialize
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn is_finite(&self) -> bool {
        match *self {
            Action::Move(dir) => dir.is_finite(),
            Action::Shoot(angle) => angle.is_finite(),
            Action::Stop => true,
            Action::MoveAndShoot(dir, angle) => dir.is_finite() && angle.is_finite(),
        }
    }

    /// Direction of the move component, if any
    pub fn movement(&self) -> Option<Vec2> {
        match *self {
            Action::Move(dir) | Action::MoveAndShoot(dir, _) => Some(dir),
            _ => None,
        }
    }

    /// Angle of the shoot component, if any
    pub fn aim(&self) -> Option<f32> {
        match *self {
            Action::Shoot(angle) | Action::MoveAndShoot(_, angle) => Some(angle),
            _ => None,
        }
    }
}

impl From<Action> for Value {
    fn from(action: Action) -> Self {
        action.into_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_every_variant() {
        assert_eq!(
            Action::parse(json!({"action": "MOVE", "param": [1.0, -2.0]})),
            Some(Action::Move(Vec2::new(1.0, -2.0)))
        );
        assert_eq!(
            Action::parse(json!({"action": "SHOOT", "param": 90})),
            Some(Action::Shoot(90.0))
        );
        assert_eq!(Action::parse(json!({"action": "STOP"})), Some(Action::Stop));
        assert_eq!(
            Action::parse(json!({"action": "MOVE_AND_SHOOT", "param": [[0, 1], 45.5]})),
            Some(Action::MoveAndShoot(Vec2::new(0.0, 1.0), 45.5))
        );
    }

    #[test]
    fn test_malformed_is_none() {
        let bad = [
            Value::Null,
            json!("MOVE"),
            json!({"action": "JUMP", "param": 3}),
            json!({"action": "MOVE", "param": [1.0]}),
            json!({"action": "MOVE", "param": ["a", "b"]}),
            json!({"action": "SHOOT"}),
            json!({"action": "SHOOT", "param": "north"}),
            json!({"param": [1, 2]}),
            json!({"action": "MOVE_AND_SHOOT", "param": [1, 2]}),
        ];
        for value in bad {
            assert_eq!(Action::parse(value.clone()), None, "{value}");
        }
    }

    #[test]
    fn test_overflowing_numbers_rejected() {
        // 1e300 does not fit an f32 and becomes infinite
        assert_eq!(Action::parse(json!({"action": "SHOOT", "param": 1e300})), None);
    }

    #[test]
    fn test_into_value_parses_back() {
        let action = Action::MoveAndShoot(Vec2::new(3.0, 4.0), -30.0);
        assert_eq!(Action::parse(action.into_value()), Some(action));
        assert_eq!(action.movement(), Some(Vec2::new(3.0, 4.0)));
        assert_eq!(action.aim(), Some(-30.0));
        assert_eq!(Action::Stop.aim(), None);
    }
}
