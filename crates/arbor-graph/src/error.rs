#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("duplicate cell id: {id}")]
    DuplicateId { id: String },

    #[error("unknown cell: {id}")]
    UnknownCell { id: String },

    #[error("edge {edge_id} has a missing endpoint")]
    MissingEndpoint { edge_id: String },

    #[error("cell {id} is not a vertex")]
    NotAVertex { id: String },

    #[error("cell {id} cannot contain children")]
    InvalidParent { id: String },

    #[error("cell {id} declares itself as the root; the root cell is implicit")]
    RootInDocument { id: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
