use super::Migration;
use super::gomod::GoMod;
use crate::config::TemplateKind;
use crate::operations::run_checked;
use crate::system::{CommandSpec, System};
use anyhow::Result;
use std::path::Path;
use tracing::{debug, info};

/// Removes the `toolchain` directive from the provider's `go.mod`
///
/// The module is looked up under `provider/` first, then at the root.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveGoToolchain;

impl Migration for RemoveGoToolchain {
    fn name(&self) -> &'static str {
        "Remove go toolchain directive"
    }

    fn should_run(&self, _template: TemplateKind) -> bool {
        true
    }

    fn migrate(&self, system: &dyn System, _template: TemplateKind, out_dir: &Path) -> Result<()> {
        let mut module_dir = None;
        for dir in [out_dir.join("provider"), out_dir.to_path_buf()] {
            if system.is_file(&dir.join("go.mod"))? {
                module_dir = Some(dir);
                break;
            }
        }
        let Some(module_dir) = module_dir else {
            debug!("No go.mod in {}", out_dir.display());
            return Ok(());
        };

        let go_mod = GoMod::load(system, &module_dir, "go.mod")?;
        if go_mod.toolchain.is_empty() {
            return Ok(());
        }

        info!("Removing toolchain {} from go.mod", go_mod.toolchain);
        run_checked(
            system,
            &CommandSpec::new("go", &module_dir).args(["mod", "edit", "-toolchain=none"]),
        )?;
        Ok(())
    }
}
