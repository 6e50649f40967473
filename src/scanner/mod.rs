use crate::error::{Result, SommelierError};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// スキャンで見つけたメニュー/レシピファイル
#[derive(Debug, Clone)]
pub struct MenuFile {
    pub path: PathBuf,
    pub file_name: String,
    pub is_image: bool,
}

const TEXT_EXTENSIONS: &[&str] = &["txt", "TXT"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "JPG", "JPEG", "PNG"];

pub fn scan_folder(folder: &Path) -> Result<Vec<MenuFile>> {
    if !folder.exists() {
        return Err(SommelierError::FolderNotFound(folder.display().to_string()));
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1) // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        if let Some(ext) = path.extension() {
            let ext_str = ext.to_string_lossy();
            let is_text = TEXT_EXTENSIONS.iter().any(|&e| e == ext_str);
            let is_image = IMAGE_EXTENSIONS.iter().any(|&e| e == ext_str);
            if is_text || is_image {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();

                files.push(MenuFile {
                    path: path.to_path_buf(),
                    file_name,
                    is_image,
                });
            }
        }
    }

    // ファイル名でソート
    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;

    #[test]
    fn test_scan_folder_not_found() {
        let result = scan_folder(Path::new("/nonexistent/folder"));
        assert!(result.is_err());
    }

    #[test]
    fn test_scan_folder_empty() {
        let temp_dir = std::env::temp_dir().join("sommelier-ai-test-empty");
        fs::create_dir_all(&temp_dir).unwrap();

        let result = scan_folder(&temp_dir).unwrap();
        assert!(result.is_empty());

        fs::remove_dir_all(&temp_dir).ok();
    }

    #[test]
    fn test_scan_folder_filters_and_sorts() {
        let temp_dir = std::env::temp_dir().join("sommelier-ai-test-scan");
        fs::create_dir_all(&temp_dir).unwrap();

        File::create(temp_dir.join("menu_b.txt"))
            .unwrap()
            .write_all(b"Caesar Salad")
            .unwrap();
        File::create(temp_dir.join("menu_a.jpg"))
            .unwrap()
            .write_all(b"dummy")
            .unwrap();
        File::create(temp_dir.join("notes.pdf"))
            .unwrap()
            .write_all(b"skip")
            .unwrap();

        let result = scan_folder(&temp_dir).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].file_name, "menu_a.jpg");
        assert!(result[0].is_image);
        assert_eq!(result[1].file_name, "menu_b.txt");
        assert!(!result[1].is_image);

        fs::remove_dir_all(&temp_dir).ok();
    }
}
