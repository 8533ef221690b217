use crate::output::{print_json, print_table};
use specify_core::check::check_all;

pub fn run(json: bool) -> anyhow::Result<()> {
    let checks = check_all();

    if json {
        return print_json(&checks);
    }

    let rows = checks
        .iter()
        .map(|c| {
            let detail = match (&c.path, &c.install_url) {
                (Some(path), _) => path.display().to_string(),
                (None, Some(url)) => format!("install: {url}"),
                (None, None) => String::new(),
            };
            vec![
                c.tool.clone(),
                if c.found { "ok" } else { "missing" }.to_string(),
                c.purpose.clone(),
                detail,
            ]
        })
        .collect();
    print_table(&["TOOL", "STATUS", "PURPOSE", "DETAIL"], rows);

    let git_found = checks.iter().any(|c| c.tool == "git" && c.found);
    let agent_found = checks
        .iter()
        .any(|c| c.found && !matches!(c.tool.as_str(), "git" | "code" | "code-insiders"));

    println!("\nSpecify CLI is ready to use.");
    if !git_found {
        println!("Tip: install git to manage feature branches.");
    }
    if !agent_found {
        println!("Tip: install an AI agent CLI for the best experience.");
    }
    Ok(())
}
