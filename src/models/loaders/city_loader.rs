use crate::error::{AppError, AppResult, BusinessError, FileError};
use crate::models::problem::{City, CityId};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::OnceCell;

/// 城市文件中的一行，坐标允许缺失
#[derive(Debug, Deserialize)]
struct CityRow {
    id: Option<CityId>,
    name: Option<String>,
    lat: Option<f64>,
    #[serde(alias = "lng")]
    lon: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CityFile {
    #[serde(default)]
    cities: Vec<CityRow>,
}

impl CityRow {
    /// 坐标不是有限数的行直接丢弃
    fn into_city(self) -> Option<City> {
        let lat = self.lat.filter(|v| v.is_finite())?;
        let lon = self.lon.filter(|v| v.is_finite())?;

        let id = self
            .id
            .or_else(|| self.name.as_deref().map(CityId::from))
            .unwrap_or_else(|| CityId::from("?"));
        let name = self.name.unwrap_or_else(|| id.to_string());

        Some(City::new(id, name, lat, lon))
    }
}

/// 解析城市列表的 TOML 文本
///
/// 同一文件内城市 ID 必须唯一
pub fn parse_cities(content: &str, source_path: &str) -> AppResult<Vec<City>> {
    let file: CityFile = toml::from_str(content).map_err(|e| {
        AppError::File(FileError::TomlParseFailed {
            path: source_path.to_string(),
            source: Box::new(e),
        })
    })?;

    let cities: Vec<City> = file.cities.into_iter().filter_map(CityRow::into_city).collect();

    let mut seen = HashSet::new();
    for city in &cities {
        if !seen.insert(&city.id) {
            return Err(BusinessError::DuplicateCityId {
                id: city.id.to_string(),
            }
            .into());
        }
    }

    Ok(cities)
}

/// 从 TOML 文件加载城市列表
pub async fn load_cities(path: &Path) -> AppResult<Vec<City>> {
    let path_text = path.display().to_string();

    if !path.exists() {
        return Err(FileError::NotFound { path: path_text }.into());
    }

    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(&path_text, e))?;

    let cities = parse_cities(&content, &path_text)?;
    tracing::info!("成功加载 {} 个城市: {}", cities.len(), path_text);

    Ok(cities)
}

/// 城市目录
///
/// 第一次加载成功后缓存，进程生命周期内不再重新读取；加载失败不缓存
pub struct CityCatalog {
    path: PathBuf,
    cache: OnceCell<Vec<City>>,
}

impl CityCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 获取城市列表（返回副本）
    pub async fn cities(&self) -> AppResult<Vec<City>> {
        let cached = self
            .cache
            .get_or_try_init(|| async { load_cities(&self.path).await })
            .await?;
        Ok(cached.clone())
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.initialized()
    }
}
