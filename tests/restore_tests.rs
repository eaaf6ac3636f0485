mod support;

use finetune_orchestrator::error::PipelineError;
use finetune_orchestrator::projects::parse_restore_entries;
use finetune_orchestrator::restore::restore_project;

use support::{context, seed_workspace, sorted_file_names, tmp_root, FakeFramework, MODEL_GROUP};

fn seed_runs(root: &std::path::Path) {
    for (run, snaps) in [
        ("CT-21", ["snapshot-000100.p", "snapshot-000200.p"]),
        ("CT-22", ["snapshot-000300.p", "snapshot-000050.p"]),
    ] {
        let dir = root.join("models").join(MODEL_GROUP).join(run);
        std::fs::create_dir_all(&dir).unwrap();
        for s in snaps {
            std::fs::write(dir.join(s), b"").unwrap();
        }
    }
}

#[test]
fn restores_bundle_from_latest_snapshots() -> anyhow::Result<()> {
    let root = tmp_root("restore");
    seed_workspace(&root, &["guava"]);
    seed_runs(&root);
    let ctx = context(&root, FakeFramework::new(99));

    let entries = parse_restore_entries("guava,CT-21,CT-22\n")?;
    let bundle = restore_project(&ctx, &entries[0])?;
    assert_eq!(bundle.files().len(), 6);
    assert_eq!(sorted_file_names(bundle.dir()).len(), 6);

    let evaluated: Vec<(String, String)> = ctx
        .runner
        .calls
        .borrow()
        .iter()
        .map(|c| (c.args[0].clone(), c.args[1].clone()))
        .collect();
    assert_eq!(
        evaluated,
        vec![
            ("CT-21".to_string(), "000200".to_string()),
            ("CT-20".to_string(), "000900".to_string()),
            ("CT-22".to_string(), "000300".to_string()),
        ]
    );

    // Staging copied the project's data into the working tree.
    assert_eq!(std::fs::read(root.join("data/stage2/train/0.p"))?, b"guava");

    let _ = std::fs::remove_dir_all(&root);
    Ok(())
}

#[test]
fn second_restore_conflicts_without_touching_files() -> anyhow::Result<()> {
    let root = tmp_root("restore_twice");
    seed_workspace(&root, &["guava"]);
    seed_runs(&root);
    let ctx = context(&root, FakeFramework::new(99));
    let entries = parse_restore_entries("guava,CT-21,CT-22\n")?;

    restore_project(&ctx, &entries[0])?;
    let dir = root.join("results/guava");
    let before: Vec<Vec<u8>> = sorted_file_names(&dir)
        .iter()
        .map(|f| std::fs::read(dir.join(f)).unwrap())
        .collect();

    let err = restore_project(&ctx, &entries[0]).unwrap_err();
    assert!(matches!(err, PipelineError::PathConflict(_)));

    let after: Vec<Vec<u8>> = sorted_file_names(&dir)
        .iter()
        .map(|f| std::fs::read(dir.join(f)).unwrap())
        .collect();
    assert_eq!(before, after);

    let _ = std::fs::remove_dir_all(&root);
    Ok(())
}

#[test]
fn unknown_run_is_reported() -> anyhow::Result<()> {
    let root = tmp_root("restore_missing_run");
    seed_workspace(&root, &["guava"]);
    let ctx = context(&root, FakeFramework::new(99));
    let entries = parse_restore_entries("guava,CT-40,CT-41\n")?;

    let err = restore_project(&ctx, &entries[0]).unwrap_err();
    assert!(matches!(err, PipelineError::MissingPath(_)));

    let _ = std::fs::remove_dir_all(&root);
    Ok(())
}
