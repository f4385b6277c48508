pub mod method_middleware;
