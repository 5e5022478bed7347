pub type Mutex<T> = ::tokio::sync::Mutex<T>;
