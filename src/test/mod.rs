
pub const COMMIT_NAME: &str = "Jamie Quigley";
pub const COMMIT_EMAIL: &str = "jamie@quigley.xyz";
pub const AUTHOR: &str = "Jamie Quigley <jamie@quigley.xyz> 1658312219 +0100";

/// `printf 'tree 0\0' | sha1sum`
pub const EMPTY_TREE: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// Create each file (and its parent directories) under `$root`, containing `"<path>-contents\n"`.
#[macro_export]
macro_rules! create_test_files {
    ($root:expr, [$($path:expr),* $(,)?]) => {{
        use std::io::Write;
        $({
            let path = $root.join($path);
            std::fs::create_dir_all(path.parent().unwrap())?;
            writeln!(std::fs::File::create(&path)?, "{}-contents", $path)?;
        })*
    }};
}
