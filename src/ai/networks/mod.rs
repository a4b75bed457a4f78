mod actor_critic_network;
mod board_encoder;
mod policy_decoder;
mod value_head;

pub use actor_critic_network::{ActorCriticNetwork, NetworkConfig, NetworkOutput, PowerPolicy};
pub use board_encoder::BoardEncoder;
pub use policy_decoder::PolicyDecoder;
pub use value_head::ValueHead;
