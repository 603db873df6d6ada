//! Method table of the command protocol.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use game_core::{ActionRequest, EngineError, GameEngine, GameState, JoinRequest, TeamId};

use super::ProtocolError;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinArgs {
    #[serde(default)]
    slot: Option<usize>,
    join: JoinRequest,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct StartArgs {
    first_slot: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitArgs {
    actions: Vec<ActionRequest>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct UndoArgs {
    team: Option<TeamId>,
    approved: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TeamArgs {
    team: TeamId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TurnArgs {
    turn_id: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerArgs {
    player_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForkArgs {
    turn_id: usize,
    new_id: String,
    /// One seed per team; drawn from the OS generator when omitted.
    #[serde(default)]
    seeds: Option<Vec<u64>>,
}

fn args<T: DeserializeOwned>(method: &str, value: Value) -> Result<T, ProtocolError> {
    // Methods without required arguments accept a missing payload.
    let value = if value.is_null() {
        Value::Object(Default::default())
    } else {
        value
    };
    serde_json::from_value(value).map_err(|source| ProtocolError::BadArgs {
        method: method.to_string(),
        source,
    })
}

fn to_value<T: serde::Serialize>(method: &str, value: T) -> Result<Value, ProtocolError> {
    serde_json::to_value(value).map_err(|source| ProtocolError::BadArgs {
        method: method.to_string(),
        source,
    })
}

fn engine<T>(result: Result<T, impl Into<EngineError>>) -> Result<T, ProtocolError> {
    result.map_err(|err| ProtocolError::Engine(err.into()))
}

/// Runs `method` against `state`.
pub(super) fn dispatch(
    state: &mut GameState,
    method: &str,
    raw: Value,
    now: DateTime<Utc>,
) -> Result<Value, ProtocolError> {
    match method {
        "join" => {
            let JoinArgs { slot, join, seed } = args(method, raw)?;
            let seed = seed.unwrap_or_else(rand::random);
            let slot = engine(GameEngine::new(state).join(slot, join, seed))?;
            to_value(method, slot)
        }
        "start" => {
            let StartArgs { first_slot } = args(method, raw)?;
            engine(GameEngine::new(state).start(now, first_slot))?;
            Ok(Value::Null)
        }
        "submitAction" => {
            let SubmitArgs { actions } = args(method, raw)?;
            let recorded = engine(GameEngine::new(state).submit_actions(&actions, now))?;
            to_value(method, recorded)
        }
        "undo" => {
            let UndoArgs { team, approved } = args(method, raw)?;
            engine(GameEngine::new(state).undo(team, approved, now))?;
            Ok(Value::Null)
        }
        "canUndo" => {
            let TeamArgs { team } = args(method, raw)?;
            to_value(method, state.can_undo(team))
        }
        "surrender" => {
            let TeamArgs { team } = args(method, raw)?;
            let recorded = engine(GameEngine::new(state).surrender(team, now))?;
            to_value(method, recorded)
        }
        "forceTimeout" => {
            let TurnArgs { turn_id } = args(method, raw)?;
            let action = engine(GameEngine::new(state).force_timeout(turn_id, now))?;
            to_value(method, action)
        }
        "getTurnData" => {
            let TurnArgs { turn_id } = args(method, raw)?;
            to_value(method, state.get_turn_data(turn_id))
        }
        "getTurnActions" => {
            let TurnArgs { turn_id } = args(method, raw)?;
            to_value(method, state.get_turn_actions(turn_id))
        }
        "getTurnTimeLimit" => {
            let TurnArgs { turn_id } = args(method, raw)?;
            to_value(method, state.get_turn_time_limit(turn_id))
        }
        "getDataForPlayer" => {
            let PlayerArgs { player_id } = args(method, raw)?;
            to_value(method, state.get_data_for_player(&player_id))
        }
        "fork" => {
            let ForkArgs {
                turn_id,
                new_id,
                seeds,
            } = args(method, raw)?;
            let seeds = seeds
                .unwrap_or_else(|| (0..state.teams.len()).map(|_| rand::random()).collect());
            let forked = engine(state.fork(turn_id, new_id, &seeds, now))?;
            to_value(method, forked)
        }
        "getState" => to_value(method, &*state),
        other => Err(ProtocolError::UnknownMethod(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::GameOptions;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn join_args(player: &str) -> Value {
        json!({
            "join": {
                "player_id": player,
                "name": player,
                "set": {
                    "name": "solo",
                    "units": [{ "kind": "Knight", "position": { "x": 5, "y": 9 } }]
                }
            },
            "seed": 7
        })
    }

    #[test]
    fn unknown_method_is_rejected() {
        let mut state = GameState::new("p", GameOptions::new(2)).unwrap();
        let err = dispatch(&mut state, "teleport", Value::Null, now()).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownMethod(name) if name == "teleport"));
    }

    #[test]
    fn missing_arguments_are_bad_args() {
        let mut state = GameState::new("p", GameOptions::new(2)).unwrap();
        let err = dispatch(&mut state, "getTurnData", Value::Null, now()).unwrap_err();
        assert!(matches!(err, ProtocolError::BadArgs { .. }));
    }

    #[test]
    fn join_and_start_through_the_table() {
        let mut state = GameState::new("p", GameOptions::new(2)).unwrap();
        let slot = dispatch(&mut state, "join", join_args("alice"), now()).unwrap();
        assert_eq!(slot, json!(0));
        dispatch(&mut state, "join", join_args("bob"), now()).unwrap();
        dispatch(&mut state, "start", Value::Null, now()).unwrap();
        assert!(state.is_started());

        let actions = dispatch(&mut state, "getTurnActions", json!({ "turnId": 0 }), now())
            .unwrap();
        assert_eq!(actions, json!([]));
    }
}
