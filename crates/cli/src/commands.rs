pub mod lessons;
pub mod login;
pub mod logout;
pub mod practice;
pub mod whoami;
