pub mod anexos;
pub mod auth;
pub mod catalog;
pub mod chamados;
pub mod health;
pub mod notificacoes;
pub mod usuarios;
pub mod ws;
