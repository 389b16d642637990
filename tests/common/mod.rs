#![allow(dead_code)]

pub mod endpoints {
    use apidispatch::endpoint::{
        Capabilities, Deletable, Endpoint, Gettable, HandlerResult, Postable, Puttable,
    };
    use apidispatch::params::{Args, ParamSpec, ParamType};
    use apidispatch::response::{Response, Status};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// `/users/{user_id}`: echoes resolved arguments and counts invocations.
    #[derive(Default)]
    pub struct UserEndpoint {
        pub calls: AtomicUsize,
    }

    impl UserEndpoint {
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn hit(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl Gettable for UserEndpoint {
        fn get_params(&self) -> Vec<ParamSpec> {
            vec![
                ParamSpec::int("user_id", 0),
                ParamSpec::string("display_name", "anonymous"),
            ]
        }

        fn get(&self, args: Args) -> HandlerResult {
            self.hit();
            Ok(Response::json(
                Status::Ok,
                json!({
                    "user_id": args.get("user_id"),
                    "display_name": args.get("display_name"),
                }),
            ))
        }
    }

    impl Puttable for UserEndpoint {
        fn put_params(&self) -> Vec<ParamSpec> {
            vec![
                ParamSpec::int("user_id", 0),
                ParamSpec::optional("display_name", ParamType::String),
            ]
        }

        fn put(&self, args: Args) -> HandlerResult {
            self.hit();
            Ok(Response::json(
                Status::Ok,
                json!({
                    "user_id": args.get("user_id"),
                    "display_name": args.get("display_name"),
                }),
            ))
        }
    }

    impl Deletable for UserEndpoint {
        fn delete(&self, _args: Args) -> HandlerResult {
            self.hit();
            Ok(Response::new(Status::NoContent))
        }
    }

    impl Endpoint for UserEndpoint {
        fn route_pattern(&self) -> &str {
            "/users/{user_id}"
        }

        fn capabilities(self: Arc<Self>) -> Capabilities {
            Capabilities::for_endpoint::<Self>().item(&self)
        }
    }

    /// `/users`: collection with `GET` and `POST`.
    #[derive(Default)]
    pub struct UserCollection {
        pub created: AtomicUsize,
    }

    impl Gettable for UserCollection {
        fn get_params(&self) -> Vec<ParamSpec> {
            vec![ParamSpec::int("page", 1), ParamSpec::int("page_size", 20)]
        }

        fn get(&self, args: Args) -> HandlerResult {
            Ok(Response::json(
                Status::Ok,
                json!({ "page": args.get("page"), "page_size": args.get("page_size") }),
            ))
        }
    }

    impl Postable for UserCollection {
        fn post_params(&self) -> Vec<ParamSpec> {
            vec![ParamSpec::string("display_name", "")]
        }

        fn post(&self, args: Args) -> HandlerResult {
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(Response::json(
                Status::Created,
                json!({ "display_name": args.get("display_name") }),
            ))
        }
    }

    impl Endpoint for UserCollection {
        fn route_pattern(&self) -> &str {
            "/users"
        }

        fn capabilities(self: Arc<Self>) -> Capabilities {
            Capabilities::for_endpoint::<Self>().get(&self).post(&self)
        }
    }

    /// Domain error used to exercise the error hook.
    #[derive(Debug)]
    pub struct Forbidden(pub String);

    impl std::fmt::Display for Forbidden {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "forbidden: {}", self.0)
        }
    }

    impl std::error::Error for Forbidden {}

    /// `/faulty/{mode}`: fails according to `mode`.
    pub struct FaultyEndpoint;

    impl Gettable for FaultyEndpoint {
        fn get_params(&self) -> Vec<ParamSpec> {
            vec![ParamSpec::string("mode", "ok")]
        }

        fn get(&self, args: Args) -> HandlerResult {
            match args.str("mode").unwrap_or("ok") {
                "error" => anyhow::bail!("database unavailable"),
                "forbidden" => Err(Forbidden("admin only".to_string()).into()),
                "panic" => panic!("handler exploded"),
                _ => Ok(Response::new(Status::Ok)),
            }
        }
    }

    impl Endpoint for FaultyEndpoint {
        fn route_pattern(&self) -> &str {
            "/faulty/{mode}"
        }

        fn capabilities(self: Arc<Self>) -> Capabilities {
            Capabilities::for_endpoint::<Self>().get(&self)
        }
    }
}

pub mod log_capture {
    use std::io;
    use std::sync::{Arc, Mutex};

    /// In-memory sink for a scoped `tracing` subscriber.
    #[derive(Clone, Default)]
    pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` with a debug-level JSON subscriber and return its output.
    pub fn capture<R>(f: impl FnOnce() -> R) -> (R, String) {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(move || writer.clone())
            .finish();
        let result = tracing::subscriber::with_default(subscriber, f);
        (result, buf.contents())
    }
}
