//! Prints the CRD manifests as a multi-document YAML stream.
//!
//! `cargo run -p crds --bin crdgen > config/crds.yaml`

use crds::Variable;
use kube::CustomResourceExt;

fn main() -> Result<(), serde_yaml::Error> {
    let crds = [Variable::crd()];
    for crd in crds {
        println!("---");
        print!("{}", serde_yaml::to_string(&crd)?);
    }
    Ok(())
}
