// gkectl-gcp: Google Cloud REST planes
// Implements the gkectl-core plane traits over container.googleapis.com
// (clusters, node pools, operations) and compute.googleapis.com (routers,
// NAT gateways, disks).

pub mod auth;
pub mod compute;
pub mod container;
pub mod http;
pub mod models;

pub use auth::Credentials;
pub use compute::ComputeClient;
pub use container::ContainerClient;
