use std::path::Path;

use aitrail_git::GitRepo;

pub fn execute(repo_root: &Path) -> anyhow::Result<()> {
    let repo = GitRepo::open(repo_root)?;
    let refs = repo.list_notes_refs();
    if refs.is_empty() {
        println!("No notes refs found.");
        return Ok(());
    }
    for r in refs {
        println!("{r}");
    }
    Ok(())
}
