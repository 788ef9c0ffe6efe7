use serde::{Deserialize, Serialize};

/// 帖子分组，接口只读
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Group {
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
}

/// 启动时载入的分组数据
#[derive(Debug, Clone, Deserialize)]
pub struct GroupFixture {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
}
