use thiserror::Error;

/// 单个点的几何错误：只对该点致命，不中断整体加载
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("invalid geometry for point {id}: ({x}, {y}) is not finite")]
    InvalidGeometry { id: u64, x: f64, y: f64 },
}

/// 索引构建 / 查询错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error(transparent)]
    InvalidGeometry(#[from] GeometryError),

    #[error("index holds zero points")]
    EmptyIndex,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PartitionError {
    #[error("cannot split {len} point(s): need at least 2")]
    EmptyPartition { len: usize },

    #[error("partition setup failed: {0}")]
    Index(#[from] IndexError),
}

/// 单条查询的错误：记录在对应 QueryResult 中，不影响同批其他查询
#[derive(Error, Debug, Clone, PartialEq, serde::Serialize)]
pub enum QueryError {
    #[error("index holds zero points")]
    EmptyIndex,

    #[error("no index to query")]
    NoIndexes,

    #[error("query point {id} has non-finite coordinates")]
    InvalidQuery { id: u64 },

    /// 直接调用（没有查询 id）时坐标非有限；批量分发时会换成 `InvalidQuery`
    #[error("query coordinates must be finite")]
    NonFiniteQuery,

    #[error("radius must be finite and non-negative, got {0}")]
    InvalidRadius(f64),

    #[error("query failed: {0}")]
    Failed(String),
}

impl From<IndexError> for QueryError {
    fn from(e: IndexError) -> Self {
        match e {
            IndexError::EmptyIndex => QueryError::EmptyIndex,
            IndexError::InvalidGeometry(GeometryError::InvalidGeometry { id, .. }) => {
                QueryError::InvalidQuery { id }
            }
        }
    }
}
