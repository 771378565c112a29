use crate::frontmatter;
use crate::paths;
use crate::snapshot::Phase;
use crate::task::{Note, Task};
use crate::types::{PhaseStatus, TaskStatus};
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// File classification
// ---------------------------------------------------------------------------

/// The four file shapes a planning tree can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Plan,
    Summary,
    State,
    Roadmap,
}

pub fn classify(path: &Path) -> Option<FileKind> {
    let name = path.file_name()?.to_str()?;
    if name.ends_with(paths::PLAN_SUFFIX) {
        Some(FileKind::Plan)
    } else if name.ends_with(paths::SUMMARY_SUFFIX) {
        Some(FileKind::Summary)
    } else if name == paths::STATE_FILE {
        Some(FileKind::State)
    } else if name == paths::ROADMAP_FILE {
        Some(FileKind::Roadmap)
    } else {
        None
    }
}

/// Whether a change to this path can alter the snapshot.
pub fn is_relevant(path: &Path) -> bool {
    classify(path).is_some()
}

// ---------------------------------------------------------------------------
// State position
// ---------------------------------------------------------------------------

/// The `phase`/`planIndex` pointer from a STATE.md header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatePosition {
    pub phase: u32,
    pub plan_index: u32,
}

/// Read the position pointer out of STATE.md content. Both fields must be
/// present and numeric, otherwise there is no usable pointer.
pub fn parse_position(content: &str) -> Option<StatePosition> {
    let (header, _) = frontmatter::split(content)?;
    let fields: Mapping = serde_yaml::from_str(header).ok()?;
    let phase = u32_value(fields.get("phase"))?;
    let plan_index = u32_value(fields.get("planIndex"))?;
    Some(StatePosition { phase, plan_index })
}

/// Everything a plan file cannot tell on its own.
#[derive(Debug, Default)]
pub struct ParseContext {
    pub position: Option<StatePosition>,
    /// Feature folder name to synthetic phase number.
    pub feature_phases: BTreeMap<String, u32>,
}

// ---------------------------------------------------------------------------
// Plan files
// ---------------------------------------------------------------------------

/// Frontmatter fields a plan may carry. Every field is optional and any
/// value of the wrong shape is treated as absent.
#[derive(Debug, Default)]
struct PlanFields {
    title: Option<String>,
    id: Option<String>,
    plan_id: Option<String>,
    phase: Option<String>,
    plan: Option<u32>,
    wave: Option<u32>,
    depends_on: Vec<String>,
    files_modified: Vec<String>,
    notes: Vec<Note>,
}

impl PlanFields {
    fn from_mapping(fields: &Mapping) -> Self {
        PlanFields {
            title: str_value(fields.get("title")),
            id: str_value(fields.get("id")),
            plan_id: str_value(fields.get("plan_id")),
            phase: str_value(fields.get("phase")),
            plan: u32_value(fields.get("plan")),
            wave: u32_value(fields.get("wave")),
            depends_on: str_list(fields.get("depends_on")),
            files_modified: str_list(fields.get("files_modified")),
            notes: notes_value(fields.get("notes")),
        }
    }
}

/// The `feature-<name>` folder a path sits under, when it sits under one.
pub fn feature_segment(path: &Path) -> Option<String> {
    let mut components = path.components();
    while let Some(component) = components.next() {
        if component.as_os_str() == paths::FEATURES_DIR {
            let folder = components.next()?.as_os_str().to_str()?;
            if folder.starts_with(paths::FEATURE_PREFIX) {
                return Some(folder.to_string());
            }
            return None;
        }
    }
    None
}

/// Parse one plan file into a [`Task`].
///
/// Identity resolution falls back from frontmatter to the filename; a file
/// is skipped (`None`) only when no fallback can produce a phase and plan
/// number. Completion is inferred from a sibling SUMMARY.md, the in-progress
/// marker from the state pointer in `ctx`.
pub fn parse_plan(path: &Path, content: &str, ctx: &ParseContext) -> Option<Task> {
    let (mapping, body) = frontmatter::mapping(content);
    let fields = PlanFields::from_mapping(&mapping);
    let file_name = path.file_name()?.to_str()?;

    let (phase_num, phase_label, plan_number) = match feature_segment(path) {
        Some(folder) => {
            let plan_number = fields
                .plan_id
                .as_deref()
                .or(fields.id.as_deref())
                .and_then(trailing_number)
                .or_else(|| leading_number(file_name))
                .unwrap_or(1);
            let phase_num = *ctx.feature_phases.get(&folder)?;
            (phase_num, folder, plan_number)
        }
        None => {
            let file_parts = plan_file_parts(file_name);
            let phase_label = fields
                .phase
                .clone()
                .or_else(|| {
                    fields
                        .id
                        .as_deref()
                        .and_then(|id| id.split_once('-'))
                        .map(|(phase, _)| phase.to_string())
                })
                .or_else(|| file_parts.as_ref().map(|(phase, _)| phase.clone()))?;
            let plan_number = fields
                .plan
                .or_else(|| fields.id.as_deref().and_then(trailing_number))
                .or_else(|| file_parts.as_ref().map(|(_, plan)| *plan))?;
            let phase_num = leading_number(&phase_label).unwrap_or(0);
            (phase_num, phase_label, plan_number)
        }
    };

    let mut status = TaskStatus::Pending;
    let mut summary = None;
    let mut duration = None;
    let mut completed_at = None;
    if let Some(sibling) = paths::summary_sibling(path).filter(|p| p.is_file()) {
        status = TaskStatus::Complete;
        if let Ok(text) = std::fs::read_to_string(&sibling) {
            let parsed = parse_summary(&text);
            summary = parsed.one_liner;
            duration = parsed.duration;
            completed_at = parsed.completed;
        }
    } else if ctx
        .position
        .is_some_and(|p| p.phase == phase_num && p.plan_index == plan_number)
    {
        status = TaskStatus::InProgress;
    }

    let name = fields
        .title
        .clone()
        .or_else(|| objective_line(body))
        .unwrap_or_else(|| format!("Plan {plan_number}"));

    Some(Task {
        id: Task::compose_id(phase_num, plan_number),
        phase_label,
        plan_number,
        wave: fields.wave.filter(|w| *w >= 1).unwrap_or(1),
        depends_on: fields.depends_on,
        status,
        name,
        summary,
        duration,
        completed_at,
        files_modified: fields.files_modified,
        source_path: path.display().to_string(),
        notes: fields.notes,
    })
}

fn objective_line(body: &str) -> Option<String> {
    let caps = objective_tag_re()
        .captures(body)
        .or_else(|| objective_heading_re().captures(body))?;
    Some(caps.get(1)?.as_str().trim().to_string())
}

// ---------------------------------------------------------------------------
// Summary files
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct SummaryFields {
    pub duration: Option<String>,
    pub completed: Option<String>,
    pub one_liner: Option<String>,
}

/// Pull the completion metadata out of a SUMMARY.md. The one-liner comes
/// from a `## One-Liner` heading, or failing that the first prose line of
/// the body.
pub fn parse_summary(content: &str) -> SummaryFields {
    let (fields, body) = frontmatter::mapping(content);
    let one_liner = one_liner_re()
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .or_else(|| first_prose_line(body));
    SummaryFields {
        duration: str_value(fields.get("duration")),
        completed: str_value(fields.get("completed")),
        one_liner,
    }
}

fn first_prose_line(body: &str) -> Option<String> {
    body.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Roadmap
// ---------------------------------------------------------------------------

/// Parse ROADMAP.md checklist structure into phases.
///
/// Each `**Phase N: Title**` checklist entry opens a segment that runs to
/// the next phase entry; plan checkboxes inside the segment are counted for
/// the rollup.
pub fn parse_roadmap(content: &str) -> Vec<Phase> {
    let matches: Vec<regex::Captures> = roadmap_phase_re().captures_iter(content).collect();
    let mut phases = Vec::with_capacity(matches.len());
    for (i, caps) in matches.iter().enumerate() {
        let Some(whole) = caps.get(0) else { continue };
        let Ok(id) = caps[2].parse::<u32>() else {
            continue;
        };
        let checked = &caps[1] == "x";
        let title = caps[3].trim().to_string();

        let segment_end = matches
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(content.len(), |m| m.start());
        let segment = &content[whole.end()..segment_end];

        let mut plans_total = 0;
        let mut plans_complete = 0;
        for plan in roadmap_plan_re().captures_iter(segment) {
            plans_total += 1;
            if &plan[1] == "x" {
                plans_complete += 1;
            }
        }

        let status = if checked {
            PhaseStatus::Complete
        } else if plans_complete > 0 {
            PhaseStatus::InProgress
        } else {
            PhaseStatus::Pending
        };

        phases.push(Phase {
            id,
            name: slugify(&title),
            full_name: format!("Phase {id}: {title}"),
            status,
            plans_total,
            plans_complete,
        });
    }
    phases
}

fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn str_value(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn u32_value(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn str_list(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Sequence(seq)) = value else {
        return Vec::new();
    };
    seq.iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

fn notes_value(value: Option<&Value>) -> Vec<Note> {
    let Some(Value::Sequence(seq)) = value else {
        return Vec::new();
    };
    seq.iter()
        .filter_map(|v| {
            let map = v.as_mapping()?;
            let content = str_value(map.get("content"))?;
            let timestamp = str_value(map.get("timestamp")).unwrap_or_default();
            Some(Note { timestamp, content })
        })
        .collect()
}

fn leading_number(s: &str) -> Option<u32> {
    let digits: String = s.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

fn trailing_number(s: &str) -> Option<u32> {
    s.rsplit('-').next()?.trim().parse().ok()
}

fn plan_file_parts(file_name: &str) -> Option<(String, u32)> {
    let caps = plan_file_re().captures(file_name)?;
    let phase = caps.get(1)?.as_str().to_string();
    let plan = caps.get(2)?.as_str().parse().ok()?;
    Some((phase, plan))
}

static PLAN_FILE_RE: OnceLock<Regex> = OnceLock::new();
static OBJECTIVE_TAG_RE: OnceLock<Regex> = OnceLock::new();
static OBJECTIVE_HEADING_RE: OnceLock<Regex> = OnceLock::new();
static ONE_LINER_RE: OnceLock<Regex> = OnceLock::new();
static ROADMAP_PHASE_RE: OnceLock<Regex> = OnceLock::new();
static ROADMAP_PLAN_RE: OnceLock<Regex> = OnceLock::new();

fn plan_file_re() -> &'static Regex {
    PLAN_FILE_RE.get_or_init(|| Regex::new(r"^(\d+)-(\d+)-PLAN\.md$").expect("valid regex"))
}

fn objective_tag_re() -> &'static Regex {
    OBJECTIVE_TAG_RE.get_or_init(|| Regex::new(r"<objective>\s*([^\n<]+)").expect("valid regex"))
}

fn objective_heading_re() -> &'static Regex {
    OBJECTIVE_HEADING_RE
        .get_or_init(|| Regex::new(r"## Objective\s*\n\s*([^\n]+)").expect("valid regex"))
}

fn one_liner_re() -> &'static Regex {
    ONE_LINER_RE.get_or_init(|| Regex::new(r"(?i)## One-Liner\s*\n\s*([^\n]+)").expect("valid regex"))
}

fn roadmap_phase_re() -> &'static Regex {
    ROADMAP_PHASE_RE.get_or_init(|| {
        Regex::new(r"- \[([ x])\] \*\*Phase (\d+): ([^*]+)\*\*").expect("valid regex")
    })
}

fn roadmap_plan_re() -> &'static Regex {
    ROADMAP_PLAN_RE
        .get_or_init(|| Regex::new(r"- \[([ x])\] \d+-\d+-PLAN\.md").expect("valid regex"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn ctx_at(phase: u32, plan_index: u32) -> ParseContext {
        ParseContext {
            position: Some(StatePosition { phase, plan_index }),
            feature_phases: BTreeMap::new(),
        }
    }

    #[test]
    fn classifies_planning_files() {
        assert_eq!(
            classify(Path::new("/p/phases/01-a/01-02-PLAN.md")),
            Some(FileKind::Plan)
        );
        assert_eq!(
            classify(Path::new("/p/phases/01-a/01-02-SUMMARY.md")),
            Some(FileKind::Summary)
        );
        assert_eq!(classify(Path::new("/p/STATE.md")), Some(FileKind::State));
        assert_eq!(classify(Path::new("/p/ROADMAP.md")), Some(FileKind::Roadmap));
        assert_eq!(classify(Path::new("/p/notes.md")), None);
        assert!(!is_relevant(Path::new("/p/config.json")));
    }

    #[test]
    fn position_requires_both_fields() {
        let pos = parse_position("---\nphase: 2\nplanIndex: 3\n---\n").unwrap();
        assert_eq!(pos, StatePosition { phase: 2, plan_index: 3 });
        assert!(parse_position("---\nphase: 2\n---\n").is_none());
        assert!(parse_position("---\nplanIndex: 3\n---\n").is_none());
        assert!(parse_position("no frontmatter here").is_none());
    }

    #[test]
    fn position_accepts_string_numbers() {
        let pos = parse_position("---\nphase: \"2\"\nplanIndex: \"10\"\n---\n").unwrap();
        assert_eq!(pos.phase, 2);
        assert_eq!(pos.plan_index, 10);
    }

    #[test]
    fn plan_with_full_frontmatter() {
        let content = "---\ntitle: Build the reducer\nphase: 02-engine\nplan: 3\nwave: 2\ndepends_on:\n  - 02-01\n  - 02-02\nfiles_modified:\n  - src/reducer.rs\n---\n# Plan\n";
        let path = PathBuf::from("/p/phases/02-engine/02-03-PLAN.md");
        let task = parse_plan(&path, content, &ParseContext::default()).unwrap();
        assert_eq!(task.id, "02-03");
        assert_eq!(task.phase_label, "02-engine");
        assert_eq!(task.plan_number, 3);
        assert_eq!(task.wave, 2);
        assert_eq!(task.depends_on, vec!["02-01", "02-02"]);
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.name, "Build the reducer");
        assert_eq!(task.files_modified, vec!["src/reducer.rs"]);
        assert_eq!(task.source_path, path.display().to_string());
    }

    #[test]
    fn plan_identity_from_id_field() {
        let content = "---\nid: 03-02\ntitle: Wire codec\n---\n";
        let task = parse_plan(
            Path::new("/p/phases/03-wire/custom-name-PLAN.md"),
            content,
            &ParseContext::default(),
        )
        .unwrap();
        assert_eq!(task.id, "03-02");
        assert_eq!(task.phase_label, "03");
        assert_eq!(task.plan_number, 2);
    }

    #[test]
    fn plan_identity_from_filename() {
        let task = parse_plan(
            Path::new("/p/phases/01-found/01-02-PLAN.md"),
            "# no frontmatter\n",
            &ParseContext::default(),
        )
        .unwrap();
        assert_eq!(task.id, "01-02");
        assert_eq!(task.phase_label, "01");
        assert_eq!(task.name, "Plan 2");
        assert_eq!(task.wave, 1);
    }

    #[test]
    fn malformed_frontmatter_degrades_to_filename_identity() {
        let content = "---\n: : broken yaml : :\n---\nbody\n";
        let task = parse_plan(
            Path::new("/p/phases/01-found/01-05-PLAN.md"),
            content,
            &ParseContext::default(),
        )
        .unwrap();
        assert_eq!(task.id, "01-05");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.name, "Plan 5");
    }

    #[test]
    fn unresolvable_identity_skips_file() {
        assert!(parse_plan(
            Path::new("/p/phases/misc/extra-PLAN.md"),
            "# nothing useful\n",
            &ParseContext::default(),
        )
        .is_none());
    }

    #[test]
    fn name_falls_back_to_objective() {
        let tagged = "---\nphase: 1\nplan: 1\n---\n<objective>Ship the watcher</objective>\n";
        let task = parse_plan(Path::new("/p/x-PLAN.md"), tagged, &ParseContext::default()).unwrap();
        assert_eq!(task.name, "Ship the watcher");

        let heading = "---\nphase: 1\nplan: 1\n---\n## Objective\n\nDebounce file events\n";
        let task = parse_plan(Path::new("/p/x-PLAN.md"), heading, &ParseContext::default()).unwrap();
        assert_eq!(task.name, "Debounce file events");
    }

    #[test]
    fn state_pointer_marks_in_progress() {
        let content = "---\nphase: 1\nplan: 2\n---\n";
        let task = parse_plan(Path::new("/p/a-PLAN.md"), content, &ctx_at(1, 2)).unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);

        let task = parse_plan(Path::new("/p/a-PLAN.md"), content, &ctx_at(1, 3)).unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[test]
    fn summary_sibling_marks_complete_and_merges_metadata() {
        let dir = TempDir::new().unwrap();
        let plan_path = dir.path().join("01-01-PLAN.md");
        std::fs::write(&plan_path, "---\ntitle: Parser\n---\n").unwrap();
        std::fs::write(
            dir.path().join("01-01-SUMMARY.md"),
            "---\nduration: 3h\ncompleted: 2026-01-10\n---\n## One-Liner\n\nParser shipped with fallbacks\n",
        )
        .unwrap();

        let task = parse_plan(&plan_path, "---\ntitle: Parser\n---\n", &ctx_at(1, 1)).unwrap();
        assert_eq!(task.status, TaskStatus::Complete);
        assert_eq!(task.summary.as_deref(), Some("Parser shipped with fallbacks"));
        assert_eq!(task.duration.as_deref(), Some("3h"));
        assert_eq!(task.completed_at.as_deref(), Some("2026-01-10"));
    }

    #[test]
    fn zero_wave_clamps_to_one() {
        let content = "---\nphase: 1\nplan: 1\nwave: 0\n---\n";
        let task = parse_plan(Path::new("/p/a-PLAN.md"), content, &ParseContext::default()).unwrap();
        assert_eq!(task.wave, 1);
    }

    #[test]
    fn feature_plan_uses_folder_and_synthetic_phase() {
        let mut ctx = ParseContext::default();
        ctx.feature_phases.insert("feature-search".to_string(), 1);
        let task = parse_plan(
            Path::new("/p/features/feature-search/02-PLAN.md"),
            "# bare\n",
            &ctx,
        )
        .unwrap();
        assert_eq!(task.id, "01-02");
        assert_eq!(task.phase_label, "feature-search");
        assert_eq!(task.plan_number, 2);
    }

    #[test]
    fn feature_plan_prefers_explicit_plan_id() {
        let mut ctx = ParseContext::default();
        ctx.feature_phases.insert("feature-auth".to_string(), 2);
        let task = parse_plan(
            Path::new("/p/features/feature-auth/01-PLAN.md"),
            "---\nplan_id: auth-3\n---\n",
            &ctx,
        )
        .unwrap();
        assert_eq!(task.id, "02-03");
    }

    #[test]
    fn feature_plan_outside_known_folders_is_skipped() {
        assert!(parse_plan(
            Path::new("/p/features/feature-ghost/01-PLAN.md"),
            "# bare\n",
            &ParseContext::default(),
        )
        .is_none());
    }

    #[test]
    fn feature_segment_requires_prefixed_folder() {
        assert_eq!(
            feature_segment(Path::new("/p/features/feature-search/01-PLAN.md")).as_deref(),
            Some("feature-search")
        );
        assert!(feature_segment(Path::new("/p/features/search/01-PLAN.md")).is_none());
        assert!(feature_segment(Path::new("/p/phases/01-a/01-01-PLAN.md")).is_none());
    }

    #[test]
    fn summary_one_liner_falls_back_to_first_prose_line() {
        let explicit = parse_summary("---\nduration: 1h\n---\n## One-Liner\n\nDid the thing\n");
        assert_eq!(explicit.one_liner.as_deref(), Some("Did the thing"));
        assert_eq!(explicit.duration.as_deref(), Some("1h"));

        let fallback = parse_summary("---\ncompleted: 2026-02-01\n---\n# Heading\n\nFirst real sentence.\n");
        assert_eq!(fallback.one_liner.as_deref(), Some("First real sentence."));
        assert_eq!(fallback.completed.as_deref(), Some("2026-02-01"));

        let empty = parse_summary("");
        assert!(empty.one_liner.is_none());
        assert!(empty.duration.is_none());
    }

    #[test]
    fn roadmap_phases_and_rollups() {
        let content = "\
# Roadmap

- [ ] **Phase 1: Foundation** - Core setup
  - [x] 01-01-PLAN.md
  - [ ] 01-02-PLAN.md
- [x] **Phase 2: Core Engine**
  - [x] 02-01-PLAN.md
- [ ] **Phase 3: Polish**
";
        let phases = parse_roadmap(content);
        assert_eq!(phases.len(), 3);

        assert_eq!(phases[0].id, 1);
        assert_eq!(phases[0].name, "foundation");
        assert_eq!(phases[0].full_name, "Phase 1: Foundation");
        assert_eq!(phases[0].status, PhaseStatus::InProgress);
        assert_eq!(phases[0].plans_total, 2);
        assert_eq!(phases[0].plans_complete, 1);

        assert_eq!(phases[1].status, PhaseStatus::Complete);
        assert_eq!(phases[1].name, "core-engine");

        assert_eq!(phases[2].status, PhaseStatus::Pending);
        assert_eq!(phases[2].plans_total, 0);
    }

    #[test]
    fn roadmap_without_phase_entries_is_empty() {
        assert!(parse_roadmap("# Roadmap\n\nNothing structured yet.\n").is_empty());
        assert!(parse_roadmap("").is_empty());
    }
}
