pub mod messaging_gateway;
pub mod slack_gateway;
