// Domain layer: request/response models shared by the core services and the HTTP adapter.

pub mod model;
