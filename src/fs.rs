//! Serving files from disk.

use std::path::{Path, PathBuf};

use http::StatusCode;

use crate::context::Context;
use crate::error::Error;
use crate::handler::{Flow, Handler};
use crate::response::{ContentType, Response};

/// Wildcard name used by [`Engine::static_files`](crate::Engine::static_files).
pub const FILEPATH_PARAM: &str = "filepath";

const INDEX: &str = "index.html";

/// Writes the default `404` page.
pub fn write_not_found(res: &mut Response) {
    res.send(StatusCode::NOT_FOUND, ContentType::Text, "404 page not found");
}

/// Sends the file at `path`, `index.html` for a directory, or a `404`.
pub(crate) fn serve_file(res: &mut Response, path: &Path) -> Result<(), Error> {
    let path = if path.is_dir() { path.join(INDEX) } else { path.to_path_buf() };
    if !path.is_file() {
        write_not_found(res);
        return Ok(());
    }
    let bytes = std::fs::read(&path)?;
    res.send(StatusCode::OK, ContentType::from_path(&path), bytes);
    Ok(())
}

/// A handler serving the `*filepath` remainder from `root`.
pub(crate) fn serve_dir(root: PathBuf) -> impl Handler {
    move |ctx: &mut Context| -> Flow {
        let rel = ctx.param(FILEPATH_PARAM);
        match resolve(&root, rel.as_str()) {
            Some(path) => ctx.serve_file(path)?,
            None => write_not_found(ctx.response_mut()),
        }
        Ok(())
    }
}

/// Joins a request path below `root`. `None` if it tries to climb out.
fn resolve(root: &Path, rel: &str) -> Option<PathBuf> {
    let mut path = root.to_path_buf();
    for part in rel.split('/') {
        match part {
            "" | "." => {}
            ".." => return None,
            p if p.contains('\\') => return None,
            p => path.push(p),
        }
    }
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_stays_below_root() {
        let root = Path::new("/srv/www");
        assert_eq!(resolve(root, "css/site.css"), Some(PathBuf::from("/srv/www/css/site.css")));
        assert_eq!(resolve(root, "./a//b"), Some(PathBuf::from("/srv/www/a/b")));
        assert_eq!(resolve(root, ""), Some(PathBuf::from("/srv/www")));
        assert_eq!(resolve(root, "../etc/passwd"), None);
        assert_eq!(resolve(root, "a/../../b"), None);
        assert_eq!(resolve(root, "..\\secret"), None);
    }

    #[test]
    fn missing_file_is_404() {
        let mut res = Response::new();
        serve_file(&mut res, Path::new("/definitely/not/here.txt")).unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.body(), b"404 page not found");
    }
}
