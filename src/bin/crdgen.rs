//! # CRD Generator
//!
//! Generates the Kubernetes CustomResourceDefinition YAML for the
//! `Operation` resource from its Rust type definition.
//!
//! ## Usage
//!
//! ```bash
//! # Generate CRD YAML
//! cargo run --bin crdgen > config/crd/operation.yaml
//!
//! # Generate and apply directly
//! cargo run --bin crdgen | kubectl apply -f -
//! ```

use kube::core::CustomResourceExt;
use operation_ttl_controller::crd::Operation;

fn main() {
    match serde_yaml::to_string(&Operation::crd()) {
        Ok(crd) => print!("{crd}"),
        Err(err) => {
            eprintln!("failed to serialize Operation CRD: {err}");
            std::process::exit(1);
        }
    }
}
