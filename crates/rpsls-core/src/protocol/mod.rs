//! Protocol types.

mod types;

pub use types::{
    ClaimData, CreateGameInput, CreatedGame, DeploymentProgress, DeploymentStep, GameInfo,
    GameStatus, JoinGameInput, JoinedGame, RevealResult, TimeoutData, TimeoutGameInfo,
    TimeoutPhase, TimeoutState,
};
