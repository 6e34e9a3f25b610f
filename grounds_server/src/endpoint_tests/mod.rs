mod auth;
mod gateway;
mod helpers;
mod mocks;
mod transactions;
