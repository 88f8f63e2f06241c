//! The `helloworld` schema shared by the client and the test servers.
//!
//! ```proto
//! package helloworld;
//!
//! service Greeter {
//!   rpc SayHello (HelloRequest) returns (HelloReply);
//! }
//! ```

pub mod pb {
    /// The request message containing the user's name.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct HelloRequest {
        #[prost(string, tag = "1")]
        pub name: ::prost::alloc::string::String,
    }

    /// The response message containing the greeting.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct HelloReply {
        #[prost(string, tag = "1")]
        pub message: ::prost::alloc::string::String,
    }

    /// Path of the `SayHello` method.
    pub const SAY_HELLO_PATH: &str = "/helloworld.Greeter/SayHello";

    include!(concat!(env!("OUT_DIR"), "/helloworld.Greeter.rs"));
}
