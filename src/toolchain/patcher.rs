//! Linker source patches that disable dead-code elimination.
//!
//! Every edit is a named [`SourcePatch`]: a target file relative to the
//! extracted `go/` tree, a marker substring, and a fixed action applied to each
//! line whose trimmed text contains the marker. Files are handled one at a
//! time with no shared state and no rollback.
//!
//! The edits are coupled to the exact wording of the upstream linker sources.
//! A file whose marker is gone is left untouched and reported as
//! [`PatchOutcome::MarkerNotFound`] so drift is visible to the caller.

use crate::config::GoliathConfig;
use crate::error::PatchError;
use crate::log_collector::LogCollector;
use crate::models::{GoVersion, PatchOutcome, PatchRecord, PatchReport, Workspace, MIN_SUPPORTED_MINOR};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};


pub const LOADER_GO: &str = "src/cmd/link/internal/loader/loader.go";
pub const DEADCODE_GO: &str = "src/cmd/link/internal/ld/deadcode.go";
pub const STACKCHECK_GO: &str = "src/cmd/link/internal/ld/stackcheck.go";
pub const LIB_GO: &str = "src/cmd/link/internal/ld/lib.go";

/// What to do with a line carrying the marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchAction {
    /// Emit these lines, then the matched line.
    InsertBefore(&'static [&'static str]),
    /// Emit the matched line, then these lines.
    InsertAfter(&'static [&'static str]),
    /// Emit this line instead of the matched one.
    ReplaceLine(&'static str),
}

/// A single named edit to one toolchain source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePatch {
    pub name: &'static str,
    /// Path relative to the extracted `go/` tree.
    pub target: &'static str,
    pub marker: &'static str,
    pub action: PatchAction,
    /// Missing target files are skipped rather than treated as errors.
    pub optional: bool,
}

/// Accessor exposing the loader's by-name symbol tables outside the package.
const SYMS_BY_NAME_ACCESSOR: &[&str] = &[
    "func (l *Loader) GetSymsByName() [2]map[string]Sym {",
    "\treturn l.symsByName",
    "}",
    "",
];

/// Seeds the dead-code roots with every known symbol name.
const ALL_SYMBOLS_AS_ROOTS: &[&str] = &[
    "\tvar symNames = (*d.ldr).GetSymsByName()[1]",
    "\tfor symName := range symNames {",
    "\t\tnames = append(names, symName)",
    "\t}",
    "",
];

/// The full patch set, in application order.
pub const LINKER_PATCHES: &[SourcePatch] = &[
    SourcePatch {
        name: "loader-syms-by-name",
        target: LOADER_GO,
        marker: "func NewLoader(",
        action: PatchAction::InsertBefore(SYMS_BY_NAME_ACCESSOR),
        optional: false,
    },
    SourcePatch {
        name: "deadcode-all-roots",
        target: DEADCODE_GO,
        marker: "for _, name := range names {",
        action: PatchAction::InsertBefore(ALL_SYMBOLS_AS_ROOTS),
        optional: false,
    },
    SourcePatch {
        name: "stackcheck-limit",
        target: STACKCHECK_GO,
        marker: "limit :=",
        action: PatchAction::ReplaceLine("\tlimit := 0xFFFFFFFF"),
        optional: true,
    },
    SourcePatch {
        name: "stkchk-short-circuit",
        target: LIB_GO,
        marker: "func (sc *stkChk) check",
        action: PatchAction::InsertAfter(&["\treturn 0"]),
        optional: true,
    },
];

impl SourcePatch {
    /// Rewrite `text`, returning the new text and the number of matched lines.
    ///
    /// Lines are split on `\n` and rejoined the same way, so everything that
    /// is not inserted or replaced is byte-identical to the input. Emitted
    /// lines take a trailing `\r` when the matched line has one.
    pub fn apply_to_text(&self, text: &str) -> (String, usize) {
        let mut out: Vec<Cow<'_, str>> = Vec::new();
        let mut matches = 0;

        for line in text.split('\n') {
            if !line.trim().contains(self.marker) {
                out.push(Cow::Borrowed(line));
                continue;
            }
            matches += 1;

            let crlf = line.ends_with('\r');
            let fixed = |l: &'static str| -> Cow<'static, str> {
                if crlf {
                    Cow::Owned(format!("{}\r", l))
                } else {
                    Cow::Borrowed(l)
                }
            };

            match self.action {
                PatchAction::InsertBefore(lines) => {
                    out.extend(lines.iter().map(|l| fixed(*l)));
                    out.push(Cow::Borrowed(line));
                }
                PatchAction::InsertAfter(lines) => {
                    out.push(Cow::Borrowed(line));
                    out.extend(lines.iter().map(|l| fixed(*l)));
                }
                PatchAction::ReplaceLine(replacement) => out.push(fixed(replacement)),
            }
        }

        (out.join("\n"), matches)
    }

    /// Apply the patch to its target under `tree`.
    ///
    /// The file is only written when at least one line matched.
    pub fn apply(&self, tree: &Path) -> Result<PatchOutcome, PatchError> {
        let path = tree.join(self.target);
        if self.optional && !path.exists() {
            return Ok(PatchOutcome::TargetAbsent);
        }

        let text = fs::read_to_string(&path).map_err(|source| PatchError::Io {
            path: path.clone(),
            source,
        })?;

        let (patched, matches) = self.apply_to_text(&text);
        if matches == 0 {
            return Ok(PatchOutcome::MarkerNotFound);
        }

        fs::write(&path, patched).map_err(|source| PatchError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(PatchOutcome::Applied { matches })
    }
}

/// Reject releases older than the patch set supports.
pub fn ensure_supported(version: &str) -> Result<GoVersion, PatchError> {
    let parsed = GoVersion::parse(version)?;
    if !parsed.is_supported() {
        return Err(PatchError::UnsupportedVersion {
            version: version.to_string(),
            min_minor: MIN_SUPPORTED_MINOR,
        });
    }
    Ok(parsed)
}

/// Applies a patch set to an extracted Go tree.
pub struct ToolchainPatcher {
    /// Root of the extracted tree (`go-<version>/go`)
    tree: PathBuf,
    patches: &'static [SourcePatch],
    strict: bool,
}

impl ToolchainPatcher {
    /// Patcher for `tree` using [`LINKER_PATCHES`].
    pub fn new(tree: PathBuf) -> Self {
        ToolchainPatcher {
            tree,
            patches: LINKER_PATCHES,
            strict: false,
        }
    }

    /// Treat a missing marker as an error.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Apply every patch in order, stopping at the first hard error.
    pub fn apply_all(&self, logger: &LogCollector) -> Result<PatchReport, PatchError> {
        let mut report = PatchReport::default();

        for patch in self.patches {
            let outcome = patch.apply(&self.tree)?;
            match outcome {
                PatchOutcome::Applied { matches } => {
                    log::debug!("[Patcher] {} applied to {} ({} line(s))", patch.name, patch.target, matches);
                }
                PatchOutcome::MarkerNotFound if self.strict => {
                    return Err(PatchError::MarkerNotFound {
                        patch: patch.name.to_string(),
                        file: PathBuf::from(patch.target),
                        marker: patch.marker.to_string(),
                    });
                }
                PatchOutcome::MarkerNotFound => {
                    logger.warn(format!(
                        "Patch '{}' skipped: '{}' not found in {}",
                        patch.name, patch.marker, patch.target
                    ));
                }
                PatchOutcome::TargetAbsent => {
                    log::debug!("[Patcher] {} not present, skipping {}", patch.target, patch.name);
                }
            }
            report.records.push(PatchRecord {
                name: patch.name.to_string(),
                target: PathBuf::from(patch.target),
                outcome,
            });
        }

        Ok(report)
    }
}

/// Patch stage: gate on the version, then patch the workspace's tree.
pub fn patch_toolchain(
    workspace: &Workspace,
    version: &str,
    config: &GoliathConfig,
    logger: &LogCollector,
) -> Result<PatchReport, PatchError> {
    logger.info("Applying patch...");
    ensure_supported(version)?;

    ToolchainPatcher::new(workspace.tree())
        .strict(config.strict_markers)
        .apply_all(logger)
}
