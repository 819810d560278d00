pub mod d501_contract_search;
